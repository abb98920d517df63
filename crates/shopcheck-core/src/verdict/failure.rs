//! Failure types and structured representation

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Severity;
use crate::envelope::BodyShape;
use crate::params::RequestParams;
use crate::scenario::ParamPlacement;

/// Failure category - determines default severity and how to read the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureType {
    /// HTTP status or envelope `responseCode` differs from the expected literal
    StatusMismatch,
    /// Message, field value or payload shape differs from the expectation
    ContentMismatch,
    /// Call took longer than the configured ceiling
    ResponseTimeExceeded,
    /// Body is neither JSON nor HTML with embedded JSON
    MalformedResponse,
    /// Service could not be reached
    Transport,
}

impl FailureType {
    /// Default severity for this failure type
    #[must_use]
    pub const fn default_severity(self) -> Severity {
        match self {
            Self::Transport | Self::ResponseTimeExceeded => Severity::Critical,
            Self::StatusMismatch | Self::ContentMismatch | Self::MalformedResponse => {
                Severity::Error
            }
        }
    }

    /// Human-readable description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::StatusMismatch => "Unexpected status code",
            Self::ContentMismatch => "Unexpected response content",
            Self::ResponseTimeExceeded => "Response time limit exceeded",
            Self::MalformedResponse => "Malformed response body",
            Self::Transport => "Request did not reach the service",
        }
    }
}

impl std::fmt::Display for FailureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Snapshot of the HTTP request for reproduction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RequestSnapshot {
    pub method: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "RequestParams::is_empty")]
    pub params: RequestParams,
    pub placement: ParamPlacement,
}

/// Snapshot of the HTTP response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResponseSnapshot {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub latency_ms: u64,
    /// How the JSON envelope was found, if it was
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<BodyShape>,
}

/// A single unmet expectation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Failure {
    /// Scenario key, e.g. "t05"
    pub scenario: String,
    /// HTTP method
    pub method: String,
    /// Endpoint path
    pub path: String,
    /// HTTP status received (absent when the call never completed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Type of failure
    pub failure_type: FailureType,
    /// Severity level
    pub severity: Severity,
    /// What the scenario expected
    pub expected: String,
    /// What came back
    pub actual: String,
    /// Full request for reproduction
    pub request: RequestSnapshot,
    /// Response received (if any)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseSnapshot>,
    /// Additional context
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
}

impl Failure {
    /// Create a failure with the type's default severity
    #[must_use]
    pub fn new(
        scenario: impl Into<String>,
        failure_type: FailureType,
        expected: impl Into<String>,
        actual: impl Into<String>,
        request: RequestSnapshot,
    ) -> Self {
        let path = request
            .url
            .split_once("://")
            .and_then(|(_, rest)| rest.find('/').map(|i| rest[i..].to_string()))
            .unwrap_or_else(|| request.url.clone());

        Self {
            scenario: scenario.into(),
            method: request.method.clone(),
            path,
            status_code: None,
            failure_type,
            severity: failure_type.default_severity(),
            expected: expected.into(),
            actual: actual.into(),
            request,
            response: None,
            context: BTreeMap::new(),
        }
    }

    /// Add response to failure
    #[must_use]
    pub fn with_response(mut self, response: ResponseSnapshot) -> Self {
        self.status_code = Some(response.status_code);
        self.response = Some(response);
        self
    }

    /// Override the endpoint path (the default is taken from the URL)
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Add context entry
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Override severity
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Downgrade to a warning and record why.
    #[must_use]
    pub fn known_flaky(self, reason: &str) -> Self {
        self.with_severity(Severity::Warning)
            .with_context("known_flaky", reason)
    }
}
