//! Blocking HTTP client bound to one service base

use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use shopcheck_core::Config;
use shopcheck_core::params::RequestParams;
use shopcheck_core::scenario::{Method, ParamPlacement};

/// What came back from one call.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
    /// Send to end of body
    pub elapsed: Duration,
}

impl RawResponse {
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("cannot build HTTP client: {0}")]
    Build(String),
    #[error("{url}: no complete response within {limit_ms} ms")]
    Timeout { url: String, limit_ms: u64 },
    #[error("{url}: {message}")]
    Transport { url: String, message: String },
}

/// One client per suite run: base URL, base path, `Accept` header and the
/// response-time ceiling are fixed at construction.
pub struct ApiClient {
    http: reqwest::blocking::Client,
    config: Config,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] if the TLS backend cannot be initialised.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.max_response_time_ms))
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        self.config.endpoint_url(path)
    }

    /// Send one request. Parameters go to the query string or a form body
    /// depending on the method; nothing is retried.
    ///
    /// # Errors
    ///
    /// [`ClientError::Timeout`] when the ceiling is hit, otherwise
    /// [`ClientError::Transport`] for anything that prevented a full response.
    pub fn send(
        &self,
        method: Method,
        path: &str,
        params: &RequestParams,
    ) -> Result<RawResponse, ClientError> {
        let url = self.url(path);

        let mut req = self
            .http
            .request(http_method(method), &url)
            .header(ACCEPT, &self.config.content_type);
        if !params.is_empty() {
            req = match method.param_placement() {
                ParamPlacement::Query => req.query(params.as_pairs()),
                ParamPlacement::Form => req.form(params.as_pairs()),
            };
        }

        let start = Instant::now();
        let resp = req.send().map_err(|e| self.classify(&url, &e))?;

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.text().map_err(|e| self.classify(&url, &e))?;

        Ok(RawResponse {
            status,
            content_type,
            body,
            elapsed: start.elapsed(),
        })
    }

    fn classify(&self, url: &str, err: &reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout {
                url: url.to_string(),
                limit_ms: self.config.max_response_time_ms,
            }
        } else {
            ClientError::Transport {
                url: url.to_string(),
                message: error_chain(err),
            }
        }
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// reqwest's top-level message hides the cause ("error sending request").
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}
