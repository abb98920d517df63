//! How much a failed expectation matters to the run

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Ordered from least to most severe; the worst failure sets the exit code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Failure in a known-flaky scenario
    Warning,
    /// Regression in a stable scenario
    Error,
    /// Service unreachable or over the response-time ceiling
    Critical,
}

impl Severity {
    /// 0 for warnings (1 under `--strict`), 1 for errors, 2 for critical.
    #[must_use]
    pub const fn exit_code(self, strict: bool) -> i32 {
        match self {
            Self::Warning if strict => 1,
            Self::Warning => 0,
            Self::Error => 1,
            Self::Critical => 2,
        }
    }

    /// Whether a failure of this severity fails the run.
    #[must_use]
    pub const fn gates(self, strict: bool) -> bool {
        self.exit_code(strict) != 0
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flaky_warnings_gate_only_when_strict() {
        assert_eq!(Severity::Warning.exit_code(false), 0);
        assert!(!Severity::Warning.gates(false));
        assert_eq!(Severity::Warning.exit_code(true), 1);
        assert!(Severity::Warning.gates(true));
    }

    #[test]
    fn regressions_and_outages_always_gate() {
        for strict in [false, true] {
            assert_eq!(Severity::Error.exit_code(strict), 1);
            assert_eq!(Severity::Critical.exit_code(strict), 2);
        }
    }

    #[test]
    fn worst_failure_is_max() {
        let worst = [Severity::Warning, Severity::Critical, Severity::Error]
            .into_iter()
            .max();
        assert_eq!(worst, Some(Severity::Critical));
    }

    #[test]
    fn lowercase_on_the_wire() {
        assert_eq!(serde_json::to_string(&Severity::Critical).unwrap(), "\"critical\"");
        let parsed: Severity = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(parsed, Severity::Warning);
    }
}
