//! Verdict policy - determines how failures are filtered and judged

use super::{Failure, FailureType, Severity};

/// Policy for filtering and judging failures
#[derive(Debug, Clone)]
pub struct VerdictPolicy {
    /// Strict mode: known-flaky failures gate like regressions
    pub strict: bool,
    /// Failure types to ignore
    pub ignore_failure_types: Vec<FailureType>,
    /// Minimum severity to report (below this = ignored)
    pub min_severity: Severity,
}

impl Default for VerdictPolicy {
    fn default() -> Self {
        Self {
            strict: false,
            ignore_failure_types: vec![],
            min_severity: Severity::Warning,
        }
    }
}

impl VerdictPolicy {
    /// Create a strict policy (known-flaky failures fail the run)
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }

    /// Filter failures according to policy
    #[must_use]
    pub fn filter(&self, failures: Vec<Failure>) -> Vec<Failure> {
        failures
            .into_iter()
            .filter(|f| self.should_report(f))
            .collect()
    }

    fn should_report(&self, failure: &Failure) -> bool {
        if self.ignore_failure_types.contains(&failure.failure_type) {
            return false;
        }
        failure.severity >= self.min_severity
    }

    /// Highest exit code among all failures, 0 when none gate the run.
    #[must_use]
    pub fn exit_code(&self, failures: &[Failure]) -> i32 {
        failures
            .iter()
            .map(|f| f.severity.exit_code(self.strict))
            .max()
            .unwrap_or(0)
    }

    /// Determine verdict from failures and scenario counts.
    ///
    /// PASS requires at least one executed scenario and no gating failure.
    #[must_use]
    pub fn verdict(&self, failures: &[Failure], executed: usize, skipped: usize) -> Verdict {
        let exit_code = self.exit_code(failures);

        let flaky = failures
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count();

        let gated = failures.iter().any(|f| f.severity.gates(self.strict));
        let status = if executed > 0 && !gated {
            VerdictStatus::Pass
        } else {
            VerdictStatus::Fail
        };

        let reason = if executed == 0 {
            "No scenarios were executed".to_string()
        } else if failures.is_empty() {
            format!("All {executed} scenarios passed")
        } else {
            let critical = failures
                .iter()
                .filter(|f| f.severity == Severity::Critical)
                .count();
            let error = failures
                .iter()
                .filter(|f| f.severity == Severity::Error)
                .count();
            let mut parts = vec![format!(
                "{} failures ({} critical, {} error, {} known-flaky)",
                failures.len(),
                critical,
                error,
                flaky
            )];
            if skipped > 0 {
                parts.push(format!("{skipped} scenarios skipped"));
            }
            parts.join("; ")
        };

        Verdict {
            status,
            exit_code,
            reason,
        }
    }
}

/// Final verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub exit_code: i32,
    pub reason: String,
}

/// Pass or fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RequestParams;
    use crate::scenario::ParamPlacement;
    use crate::verdict::RequestSnapshot;

    fn sample_request() -> RequestSnapshot {
        RequestSnapshot {
            method: "GET".to_string(),
            url: "http://localhost/api/brandsList".to_string(),
            params: RequestParams::new(),
            placement: ParamPlacement::Query,
        }
    }

    fn failure(failure_type: FailureType) -> Failure {
        Failure::new("t03", failure_type, "200", "500", sample_request())
    }

    fn flaky_failure() -> Failure {
        failure(FailureType::ContentMismatch).known_flaky("unstable")
    }

    #[test]
    fn default_policy_is_lenient_about_flaky() {
        let policy = VerdictPolicy::default();
        assert!(!policy.strict);
        assert_eq!(policy.exit_code(&[flaky_failure()]), 0);
    }

    #[test]
    fn strict_policy_gates_flaky() {
        assert_eq!(VerdictPolicy::strict().exit_code(&[flaky_failure()]), 1);
    }

    #[test]
    fn exit_code_highest_severity_wins() {
        let policy = VerdictPolicy::default();
        let failures = vec![
            flaky_failure(),
            failure(FailureType::ContentMismatch),
            failure(FailureType::Transport),
        ];
        assert_eq!(policy.exit_code(&failures), 2);
    }

    #[test]
    fn filter_ignores_failure_types() {
        let policy = VerdictPolicy {
            ignore_failure_types: vec![FailureType::ResponseTimeExceeded],
            ..Default::default()
        };
        let kept = policy.filter(vec![
            failure(FailureType::ResponseTimeExceeded),
            failure(FailureType::StatusMismatch),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].failure_type, FailureType::StatusMismatch);
    }

    #[test]
    fn filter_respects_min_severity() {
        let policy = VerdictPolicy {
            min_severity: Severity::Error,
            ..Default::default()
        };
        assert!(policy.filter(vec![flaky_failure()]).is_empty());
    }

    #[test]
    fn verdict_all_passed() {
        let v = VerdictPolicy::default().verdict(&[], 14, 0);
        assert_eq!(v.status, VerdictStatus::Pass);
        assert_eq!(v.exit_code, 0);
        assert_eq!(v.reason, "All 14 scenarios passed");
    }

    #[test]
    fn verdict_nothing_executed_is_fail() {
        let v = VerdictPolicy::default().verdict(&[], 0, 0);
        assert_eq!(v.status, VerdictStatus::Fail);
        assert!(v.reason.contains("No scenarios"));
    }

    #[test]
    fn verdict_flaky_only_passes_but_is_visible() {
        let v = VerdictPolicy::default().verdict(&[flaky_failure(), flaky_failure()], 14, 0);
        assert_eq!(v.status, VerdictStatus::Pass);
        assert!(v.reason.contains("2 known-flaky"));
    }

    #[test]
    fn verdict_regression_fails_and_counts_skips() {
        let v = VerdictPolicy::default().verdict(&[failure(FailureType::StatusMismatch)], 5, 9);
        assert_eq!(v.status, VerdictStatus::Fail);
        assert_eq!(v.exit_code, 1);
        assert!(v.reason.contains("1 failures (0 critical, 1 error, 0 known-flaky)"));
        assert!(v.reason.contains("9 scenarios skipped"));
    }
}
