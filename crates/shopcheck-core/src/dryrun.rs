//! Dry run plan types and config validation
//!
//! Describes what the suite *would* send without sending anything.
//! Used for pre-flight validation and CI previews.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Config;
use crate::fixture::UserAccount;
use crate::scenario::{ParamPlacement, Stability, Suite};

// ── Plan types ──

/// Complete dry run plan: scenarios in run order plus config checks.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SuitePlan {
    /// Scenarios in the order they would run
    pub scenarios: Vec<PlannedScenario>,
    /// Config validation results
    pub validations: Vec<Validation>,
}

/// One scenario as it would be sent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlannedScenario {
    pub key: String,
    pub title: String,
    /// Operation label, e.g. "POST /verifyLogin"
    pub operation: String,
    /// Resolved endpoint URL
    pub url: String,
    pub placement: ParamPlacement,
    /// Parameter names in wire order
    pub parameters: Vec<String>,
    /// Expected envelope `responseCode`
    pub response_code: u16,
    /// Content expectations, described
    pub checks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    /// Set when failures are reported but never gate the run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_flaky: Option<String>,
}

/// A validation check result.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Validation {
    pub check: String,
    pub status: ValidationStatus,
    pub message: String,
}

/// Status of a validation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Ok,
    Warning,
    Error,
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl SuitePlan {
    /// Build the plan for `suite` against `config`, with `account` as the run's identity.
    #[must_use]
    pub fn build(suite: &Suite, config: &Config, account: &UserAccount) -> Self {
        let scenarios = suite
            .scenarios()
            .iter()
            .map(|s| PlannedScenario {
                key: s.key.to_string(),
                title: s.title.to_string(),
                operation: s.operation(),
                url: config.endpoint_url(s.path),
                placement: s.method.param_placement(),
                parameters: s.params.resolve(config, account).names(),
                response_code: s.expect.response_code,
                checks: s
                    .expect
                    .signals
                    .iter()
                    .map(|sig| sig.describe(Some(account)))
                    .collect(),
                depends_on: s.depends_on.map(str::to_string),
                known_flaky: match &s.stability {
                    Stability::Stable => None,
                    Stability::KnownFlaky { reason } => Some((*reason).to_string()),
                },
            })
            .collect();

        Self {
            scenarios,
            validations: validate_config(config),
        }
    }
}

// ── Config validation ──

fn check(name: &str, status: ValidationStatus, message: String) -> Validation {
    Validation {
        check: name.into(),
        status,
        message,
    }
}

/// Validate config and produce validation results.
#[must_use]
pub fn validate_config(config: &Config) -> Vec<Validation> {
    let mut checks = Vec::new();

    if config.base_url.starts_with("http://") || config.base_url.starts_with("https://") {
        checks.push(check(
            "base_url",
            ValidationStatus::Ok,
            format!("base_url: {}", config.base_url),
        ));
    } else {
        checks.push(check(
            "base_url",
            ValidationStatus::Error,
            format!(
                "base_url: {} (missing http:// or https:// prefix)",
                config.base_url
            ),
        ));
    }

    if config.base_path.is_empty() || config.base_path.starts_with('/') {
        checks.push(check(
            "base_path",
            ValidationStatus::Ok,
            format!("base_path: {:?}", config.base_path),
        ));
    } else {
        checks.push(check(
            "base_path",
            ValidationStatus::Warning,
            format!("base_path: {:?} (expected a leading '/')", config.base_path),
        ));
    }

    if config.max_response_time_ms == 0 {
        checks.push(check(
            "max_response_time_ms",
            ValidationStatus::Error,
            "max_response_time_ms: 0 (every call would time out)".into(),
        ));
    } else {
        checks.push(check(
            "max_response_time_ms",
            ValidationStatus::Ok,
            format!("max_response_time_ms: {}", config.max_response_time_ms),
        ));
    }

    if config.login.email.is_empty() || config.login.password.is_empty() {
        checks.push(check(
            "login",
            ValidationStatus::Warning,
            "login: email or password is empty (login scenarios will fail)".into(),
        ));
    } else if config.login.password == config.login.wrong_password {
        checks.push(check(
            "login",
            ValidationStatus::Warning,
            "login: wrong_password equals password".into(),
        ));
    } else {
        checks.push(check(
            "login",
            ValidationStatus::Ok,
            format!("login: {}", config.login.email),
        ));
    }

    checks
}

// ── Display helpers ──

impl SuitePlan {
    /// Format as human-readable terminal output.
    #[must_use]
    pub fn to_terminal(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Dry run: {} scenarios planned\n", self.scenarios.len()));

        for s in &self.scenarios {
            lines.push(format!("{} {} -> {}", s.key, s.operation, s.title));
            lines.push(format!("  URL: {}", s.url));
            if !s.parameters.is_empty() {
                let placement = match s.placement {
                    ParamPlacement::Query => "query",
                    ParamPlacement::Form => "form",
                };
                lines.push(format!("  Params ({placement}): {}", s.parameters.join(", ")));
            }
            lines.push(format!("  Expect: responseCode {}", s.response_code));
            for c in &s.checks {
                lines.push(format!("    - {c}"));
            }
            if let Some(dep) = &s.depends_on {
                lines.push(format!("  After: {dep}"));
            }
            if let Some(reason) = &s.known_flaky {
                lines.push(format!("  Known flaky: {reason}"));
            }
            lines.push(String::new());
        }

        lines.push("Config validation:".into());
        for v in &self.validations {
            lines.push(format!("  [{}] {}", v.status, v.message));
        }

        lines.join("\n")
    }

    /// Returns true if any validation has Error status.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.validations
            .iter()
            .any(|v| v.status == ValidationStatus::Error)
    }

    /// Returns true if any validation has Warning status.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.validations
            .iter()
            .any(|v| v.status == ValidationStatus::Warning)
    }
}
