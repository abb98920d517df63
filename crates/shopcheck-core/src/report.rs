//! Report model: per-scenario outcomes and the exchanges behind them
//!
//! This is the interchange format written by `shopcheck run` (report.json)
//! and exported as JSON Schema by `shopcheck schema`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::fixture::RunTag;
use crate::verdict::{Failure, RequestSnapshot, ResponseSnapshot};

/// One request/response pair as observed by the suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Exchange {
    /// Scenario key
    pub scenario: String,
    /// Operation label: "POST /verifyLogin"
    pub operation: String,
    pub request: RequestSnapshot,
    /// Absent when the call failed before a response arrived
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseSnapshot>,
    /// Parsed envelope, when the body could be extracted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope: Option<Envelope>,
    /// Transport error text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// How a scenario ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Passed,
    Failed,
    /// Failed, but the scenario is known to be unreliable upstream
    FlakyFailed,
    /// Not executed (stop-on-failure)
    Skipped,
}

impl OutcomeStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Passed => "PASS",
            Self::Failed => "FAIL",
            Self::FlakyFailed => "FLAKY",
            Self::Skipped => "SKIP",
        }
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioOutcome {
    pub key: String,
    pub title: String,
    pub operation: String,
    pub status: OutcomeStatus,
    #[serde(default)]
    pub failures: Vec<Failure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<Exchange>,
    #[serde(default)]
    pub duration_ms: u64,
}

/// Whole-run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SuiteReport {
    /// Identifier the run's account was derived from
    pub run_tag: RunTag,
    pub base_url: String,
    /// RFC 3339 UTC start time
    pub started_at: String,
    pub duration_ms: u64,
    pub outcomes: Vec<ScenarioOutcome>,
}

impl SuiteReport {
    fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(OutcomeStatus::Passed)
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(OutcomeStatus::Failed)
    }

    #[must_use]
    pub fn flaky_failed(&self) -> usize {
        self.count(OutcomeStatus::FlakyFailed)
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(OutcomeStatus::Skipped)
    }

    /// Scenarios that actually sent a request.
    #[must_use]
    pub fn executed(&self) -> usize {
        self.outcomes.len() - self.skipped()
    }

    /// All failures in run order.
    #[must_use]
    pub fn failures(&self) -> Vec<Failure> {
        self.outcomes
            .iter()
            .flat_map(|o| o.failures.iter().cloned())
            .collect()
    }

    /// All exchanges in run order.
    #[must_use]
    pub fn exchanges(&self) -> Vec<&Exchange> {
        self.outcomes
            .iter()
            .filter_map(|o| o.exchange.as_ref())
            .collect()
    }
}

/// Generate JSON Schema for the report format.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(SuiteReport);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RequestParams;
    use crate::scenario::ParamPlacement;
    use crate::verdict::FailureType;

    fn request() -> RequestSnapshot {
        RequestSnapshot {
            method: "GET".into(),
            url: "http://localhost/api/productsList".into(),
            params: RequestParams::new(),
            placement: ParamPlacement::Query,
        }
    }

    fn outcome(key: &str, status: OutcomeStatus, failures: Vec<Failure>) -> ScenarioOutcome {
        ScenarioOutcome {
            key: key.into(),
            title: key.into(),
            operation: "GET /productsList".into(),
            status,
            failures,
            exchange: None,
            duration_ms: 3,
        }
    }

    fn report() -> SuiteReport {
        let f = Failure::new("t02", FailureType::StatusMismatch, "405", "200", request());
        SuiteReport {
            run_tag: RunTag::fixed("abc"),
            base_url: "http://localhost".into(),
            started_at: "2026-01-01T00:00:00Z".into(),
            duration_ms: 10,
            outcomes: vec![
                outcome("t01", OutcomeStatus::Passed, vec![]),
                outcome("t02", OutcomeStatus::Failed, vec![f.clone()]),
                outcome("t12", OutcomeStatus::FlakyFailed, vec![f.known_flaky("x")]),
                outcome("t13", OutcomeStatus::Skipped, vec![]),
            ],
        }
    }

    #[test]
    fn counts_by_status() {
        let r = report();
        assert_eq!(r.passed(), 1);
        assert_eq!(r.failed(), 1);
        assert_eq!(r.flaky_failed(), 1);
        assert_eq!(r.skipped(), 1);
        assert_eq!(r.executed(), 3);
        assert_eq!(r.failures().len(), 2);
    }

    #[test]
    fn report_serialization_roundtrip() {
        let r = report();
        let json = serde_json::to_string(&r).unwrap();
        let parsed: SuiteReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, r);
        assert!(json.contains(r#""status":"flaky_failed""#));
    }

    #[test]
    fn schema_names_the_report() {
        let schema: serde_json::Value = serde_json::from_str(&generate_schema()).unwrap();
        assert_eq!(
            schema.get("title").and_then(|v| v.as_str()),
            Some("SuiteReport")
        );
    }
}
