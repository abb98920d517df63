//! Report hooks: observers of a suite run
//!
//! Hooks see every exchange and every outcome by shared reference. They run
//! after the outcome is decided and cannot change it; a run with no hooks
//! produces the same report.

use std::sync::{Arc, Mutex};

use shopcheck_core::report::{Exchange, OutcomeStatus, ScenarioOutcome};

pub trait ReportHook {
    /// Called once per request that was sent.
    fn on_exchange(&self, _exchange: &Exchange) {}

    /// Called once per scenario, skipped ones included.
    fn on_outcome(&self, _outcome: &ScenarioOutcome) {}
}

/// Emits exchanges and outcomes as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHook;

impl ReportHook for TracingHook {
    fn on_exchange(&self, exchange: &Exchange) {
        match &exchange.response {
            Some(resp) => tracing::debug!(
                scenario = %exchange.scenario,
                operation = %exchange.operation,
                url = %exchange.request.url,
                params = ?exchange.request.params.masked().as_pairs(),
                status = resp.status_code,
                latency_ms = resp.latency_ms,
                body = resp.body.as_deref().unwrap_or(""),
                "exchange"
            ),
            None => tracing::debug!(
                scenario = %exchange.scenario,
                operation = %exchange.operation,
                url = %exchange.request.url,
                error = exchange.error.as_deref().unwrap_or(""),
                "exchange without response"
            ),
        }
    }

    fn on_outcome(&self, outcome: &ScenarioOutcome) {
        match outcome.status {
            OutcomeStatus::Passed => {
                tracing::info!(scenario = %outcome.key, duration_ms = outcome.duration_ms, "passed");
            }
            OutcomeStatus::Skipped => tracing::info!(scenario = %outcome.key, "skipped"),
            OutcomeStatus::Failed | OutcomeStatus::FlakyFailed => {
                for f in &outcome.failures {
                    tracing::warn!(
                        scenario = %outcome.key,
                        kind = ?f.failure_type,
                        severity = %f.severity,
                        expected = %f.expected,
                        actual = %f.actual,
                        "{}",
                        outcome.status
                    );
                }
            }
        }
    }
}

/// Keeps a copy of every exchange and outcome.
///
/// Clones share storage, so keep one handle and pass a clone to the runner.
#[derive(Debug, Default, Clone)]
pub struct RecordingHook {
    exchanges: Arc<Mutex<Vec<Exchange>>>,
    outcomes: Arc<Mutex<Vec<ScenarioOutcome>>>,
}

impl RecordingHook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn exchanges(&self) -> Vec<Exchange> {
        self.exchanges.lock().map(|v| v.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn outcomes(&self) -> Vec<ScenarioOutcome> {
        self.outcomes.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl ReportHook for RecordingHook {
    fn on_exchange(&self, exchange: &Exchange) {
        if let Ok(mut v) = self.exchanges.lock() {
            v.push(exchange.clone());
        }
    }

    fn on_outcome(&self, outcome: &ScenarioOutcome) {
        if let Ok(mut v) = self.outcomes.lock() {
            v.push(outcome.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopcheck_core::params::RequestParams;
    use shopcheck_core::scenario::ParamPlacement;
    use shopcheck_core::verdict::RequestSnapshot;

    fn exchange() -> Exchange {
        Exchange {
            scenario: "t09".into(),
            operation: "DELETE /verifyLogin".into(),
            request: RequestSnapshot {
                method: "DELETE".into(),
                url: "http://localhost/api/verifyLogin".into(),
                params: RequestParams::new(),
                placement: ParamPlacement::Query,
            },
            response: None,
            envelope: None,
            error: Some("connection refused".into()),
        }
    }

    #[test]
    fn recording_hook_clones_share_storage() {
        let hook = RecordingHook::new();
        let handle = hook.clone();
        hook.on_exchange(&exchange());
        hook.on_outcome(&ScenarioOutcome {
            key: "t09".into(),
            title: "DELETE to verify login".into(),
            operation: "DELETE /verifyLogin".into(),
            status: OutcomeStatus::Skipped,
            failures: vec![],
            exchange: None,
            duration_ms: 0,
        });
        assert_eq!(handle.exchanges().len(), 1);
        assert_eq!(handle.outcomes()[0].status, OutcomeStatus::Skipped);
    }

    #[test]
    fn default_methods_are_no_ops() {
        struct Silent;
        impl ReportHook for Silent {}
        Silent.on_exchange(&exchange());
    }
}
