//! Suite configuration: target service, response-time ceiling, login fixtures

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Suite configuration, loaded once before the first scenario runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Scheme + host of the service under test
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix shared by every endpoint
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Media type requested through the `Accept` header
    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// Hard ceiling for a single call, in milliseconds
    #[serde(default = "default_max_response_time_ms")]
    pub max_response_time_ms: u64,

    /// Credentials of a pre-existing account used by the login scenarios
    #[serde(default)]
    pub login: LoginFixture,

    /// Account targeted by the delete scenario
    #[serde(default)]
    pub stale_account: StaleAccount,

    /// Dump every request/response pair to JSONL files
    #[serde(default)]
    pub dump: bool,

    /// Directory for dump files (default: ".shopcheck/dumps")
    #[serde(default)]
    pub dump_dir: Option<PathBuf>,
}

/// Known account on the remote service.
///
/// ```toml
/// [login]
/// email = "helen@gmail.com"
/// password = "12345"
/// wrong_password = "11111"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginFixture {
    pub email: String,
    pub password: String,
    /// Sent with `email` to provoke "User not found!"
    pub wrong_password: String,
    /// Sent alone (no email) to provoke the missing-parameter error
    #[serde(default = "default_orphan_password")]
    pub orphan_password: String,
}

impl Default for LoginFixture {
    fn default() -> Self {
        Self {
            email: "helen@gmail.com".to_string(),
            password: "12345".to_string(),
            wrong_password: "11111".to_string(),
            orphan_password: default_orphan_password(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleAccount {
    pub email: String,
    pub password: String,
}

impl Default for StaleAccount {
    fn default() -> Self {
        Self {
            email: "aline@email.com".to_string(),
            password: "aline123".to_string(),
        }
    }
}

fn default_base_url() -> String {
    "https://automationexercise.com".to_string()
}

fn default_base_path() -> String {
    "/api".to_string()
}

fn default_content_type() -> String {
    "application/json".to_string()
}

const fn default_max_response_time_ms() -> u64 {
    1_000_000
}

fn default_orphan_password() -> String {
    "1234".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            base_path: default_base_path(),
            content_type: default_content_type(),
            max_response_time_ms: default_max_response_time_ms(),
            login: LoginFixture::default(),
            stale_account: StaleAccount::default(),
            dump: false,
            dump_dir: None,
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// `.json` and `.yaml`/`.yml` are parsed by extension, anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "json" => serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string())),
            "yaml" | "yml" => {
                serde_yml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            _ => toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Load from default location (.shopcheck.toml)
    pub fn load_default() -> Result<Self, ConfigError> {
        let candidates = [".shopcheck.toml", ".shopcheck.json", "shopcheck.toml"];

        for name in candidates {
            let path = Path::new(name);
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    /// Full URL of an endpoint: base URL + base path + path, one slash per seam.
    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.base_path.trim_matches('/');
        let path = path.trim_start_matches('/');
        if prefix.is_empty() {
            format!("{base}/{path}")
        } else {
            format!("{base}/{prefix}/{path}")
        }
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# shopcheck configuration

# Service under test
base_url = "https://automationexercise.com"
base_path = "/api"

# Accept header sent with every request
content_type = "application/json"

# A single call slower than this fails its scenario (milliseconds)
max_response_time_ms = 1000000

# Pre-existing account for the login scenarios
[login]
email = "helen@gmail.com"
password = "12345"
wrong_password = "11111"
# orphan_password = "1234"

# Account the delete scenario tries to remove
[stale_account]
email = "aline@email.com"
password = "aline123"

# Dump all request/response pairs to JSONL files (default: false)
# dump = true
# dump_dir = ".shopcheck/dumps"
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_live_service() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://automationexercise.com");
        assert_eq!(config.base_path, "/api");
        assert_eq!(config.content_type, "application/json");
        assert_eq!(config.max_response_time_ms, 1_000_000);
        assert_eq!(config.login.email, "helen@gmail.com");
        assert_eq!(config.stale_account.password, "aline123");
    }

    #[test]
    fn parse_toml_partial_keeps_defaults() {
        let toml = r#"
base_url = "http://localhost:3000"
max_response_time_ms = 2500

[login]
email = "qa@example.com"
password = "pw"
wrong_password = "nope"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.base_path, "/api");
        assert_eq!(config.max_response_time_ms, 2500);
        assert_eq!(config.login.email, "qa@example.com");
        assert_eq!(config.login.orphan_password, "1234");
        assert_eq!(config.stale_account, StaleAccount::default());
        assert!(!config.dump);
    }

    #[test]
    fn example_parses() {
        let config: Config = toml::from_str(Config::example()).unwrap();
        assert_eq!(config.base_url, "https://automationexercise.com");
        assert_eq!(config.login, LoginFixture::default());
    }

    #[test]
    fn load_json_and_yaml_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("suite.json");
        std::fs::write(&json_path, r#"{"base_url": "http://json.local"}"#).unwrap();
        assert_eq!(Config::load(&json_path).unwrap().base_url, "http://json.local");

        let yaml_path = dir.path().join("suite.yaml");
        std::fs::write(&yaml_path, "base_url: http://yaml.local\nbase_path: /v2\n").unwrap();
        let yaml = Config::load(&yaml_path).unwrap();
        assert_eq!(yaml.base_url, "http://yaml.local");
        assert_eq!(yaml.base_path, "/v2");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Config::load(Path::new("/nonexistent/shopcheck.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }

    #[test]
    fn load_garbage_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "base_url = [").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn endpoint_url_joins_with_single_slashes() {
        let mut config = Config::default();
        assert_eq!(
            config.endpoint_url("/productsList"),
            "https://automationexercise.com/api/productsList"
        );

        config.base_url = "http://127.0.0.1:8080/".into();
        config.base_path = "api/".into();
        assert_eq!(
            config.endpoint_url("brandsList"),
            "http://127.0.0.1:8080/api/brandsList"
        );

        config.base_path = String::new();
        assert_eq!(
            config.endpoint_url("/verifyLogin"),
            "http://127.0.0.1:8080/verifyLogin"
        );
    }
}
