//! Ordered scenario engine
//!
//! Runs a [`Suite`] top to bottom, one blocking call per scenario. The run's
//! identity is generated once and lent to every scenario through
//! [`ScenarioContext`].

use std::collections::HashSet;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use shopcheck_core::Config;
use shopcheck_core::clock::timestamp_iso;
use shopcheck_core::fixture::{RunTag, UserAccount};
use shopcheck_core::report::{Exchange, OutcomeStatus, ScenarioOutcome, SuiteReport};
use shopcheck_core::scenario::{Scenario, Suite};
use shopcheck_core::verdict::{Failure, FailureType, RequestSnapshot};

use crate::checks::{CheckInput, downgrade_if_flaky, evaluate};
use crate::client::{ApiClient, ClientError};
use crate::hooks::ReportHook;

/// Read-only state shared by every scenario of one run.
pub struct ScenarioContext<'a> {
    pub config: &'a Config,
    pub run_tag: &'a RunTag,
    pub account: &'a UserAccount,
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Client(#[from] ClientError),
}

pub struct SuiteRunner {
    config: Config,
    run_tag: Option<RunTag>,
    stop_on_failure: bool,
    progress: bool,
    hooks: Vec<Box<dyn ReportHook>>,
}

impl SuiteRunner {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            config: config.clone(),
            run_tag: None,
            stop_on_failure: false,
            progress: false,
            hooks: Vec::new(),
        }
    }

    /// Reuse a tag instead of generating one (replays, tests).
    #[must_use]
    pub fn with_run_tag(mut self, tag: RunTag) -> Self {
        self.run_tag = Some(tag);
        self
    }

    /// After the first regression, skip the remaining scenarios.
    #[must_use]
    pub fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    /// Print one progress line per scenario to stderr.
    #[must_use]
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn with_hook(mut self, hook: impl ReportHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Execute the suite in declared order.
    ///
    /// Scenario failures are part of the report; only a client that cannot be
    /// built is an error.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Client`] if the HTTP client cannot be built.
    pub fn run(&self, suite: &Suite) -> Result<SuiteReport, RunError> {
        let client = ApiClient::new(&self.config)?;
        let run_tag = self
            .run_tag
            .clone()
            .unwrap_or_else(|| RunTag::generate(&mut SmallRng::from_entropy()));
        let account = UserAccount::for_run(&run_tag);
        let ctx = ScenarioContext {
            config: &self.config,
            run_tag: &run_tag,
            account: &account,
        };

        let started_at = timestamp_iso();
        let start = Instant::now();
        tracing::info!(
            run_tag = %run_tag,
            base_url = %self.config.base_url,
            scenarios = suite.len(),
            "suite started"
        );
        if self.progress {
            eprintln!(
                "Running {} scenarios against {} (run {run_tag})...",
                suite.len(),
                client.url("")
            );
        }

        let mut outcomes = Vec::with_capacity(suite.len());
        let mut failed: HashSet<&str> = HashSet::new();
        let mut stopped = false;

        for scenario in suite.scenarios() {
            let outcome = if stopped {
                skipped(scenario)
            } else {
                let broken_dependency = scenario.depends_on.filter(|dep| failed.contains(dep));
                if let Some(dep) = broken_dependency {
                    tracing::warn!(
                        scenario = scenario.key,
                        depends_on = dep,
                        "running after failed prerequisite"
                    );
                }
                self.run_one(&client, &ctx, scenario, broken_dependency)
            };

            match outcome.status {
                OutcomeStatus::Failed => {
                    failed.insert(scenario.key);
                    stopped |= self.stop_on_failure;
                }
                OutcomeStatus::FlakyFailed => {
                    failed.insert(scenario.key);
                }
                OutcomeStatus::Passed | OutcomeStatus::Skipped => {}
            }

            if self.progress {
                eprintln!("{}", progress_line(&outcome));
            }
            for hook in &self.hooks {
                hook.on_outcome(&outcome);
            }
            outcomes.push(outcome);
        }

        if stopped
            && self.progress
            && outcomes.iter().any(|o| o.status == OutcomeStatus::Skipped)
        {
            eprintln!("Stopped early: failure detected (--stop-on-failure)");
        }

        let report = SuiteReport {
            run_tag,
            base_url: self.config.base_url.clone(),
            started_at,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            outcomes,
        };
        tracing::info!(
            passed = report.passed(),
            failed = report.failed(),
            flaky_failed = report.flaky_failed(),
            skipped = report.skipped(),
            duration_ms = report.duration_ms,
            "suite finished"
        );
        Ok(report)
    }

    fn run_one(
        &self,
        client: &ApiClient,
        ctx: &ScenarioContext,
        scenario: &Scenario,
        broken_dependency: Option<&str>,
    ) -> ScenarioOutcome {
        let params = scenario.params.resolve(ctx.config, ctx.account);
        let request = RequestSnapshot {
            method: scenario.method.to_string(),
            url: client.url(scenario.path),
            params: params.clone(),
            placement: scenario.method.param_placement(),
        };
        tracing::debug!(
            run_tag = %ctx.run_tag,
            scenario = scenario.key,
            url = %request.url,
            "sending"
        );

        let start = Instant::now();
        let (failures, exchange) = match client.send(scenario.method, scenario.path, &params) {
            Ok(response) => {
                let eval = evaluate(&CheckInput {
                    scenario,
                    account: ctx.account,
                    request: &request,
                    response: &response,
                    max_response_time_ms: ctx.config.max_response_time_ms,
                });
                let exchange = Exchange {
                    scenario: scenario.key.to_string(),
                    operation: scenario.operation(),
                    request: request.clone(),
                    response: Some(eval.snapshot),
                    envelope: eval.envelope,
                    error: None,
                };
                (eval.failures, exchange)
            }
            Err(err) => {
                let (failure_type, expected) = match &err {
                    ClientError::Timeout { limit_ms, .. } => {
                        (FailureType::ResponseTimeExceeded, format!("< {limit_ms} ms"))
                    }
                    ClientError::Build(_) | ClientError::Transport { .. } => {
                        (FailureType::Transport, "a response".to_string())
                    }
                };
                let failure = Failure::new(
                    scenario.key,
                    failure_type,
                    expected,
                    err.to_string(),
                    request.clone(),
                )
                .with_path(scenario.path);
                let exchange = Exchange {
                    scenario: scenario.key.to_string(),
                    operation: scenario.operation(),
                    request: request.clone(),
                    response: None,
                    envelope: None,
                    error: Some(err.to_string()),
                };
                (downgrade_if_flaky(scenario, vec![failure]), exchange)
            }
        };

        for hook in &self.hooks {
            hook.on_exchange(&exchange);
        }

        let failures: Vec<Failure> = match broken_dependency {
            Some(dep) => failures
                .into_iter()
                .map(|f| f.with_context("dependency", format!("{dep} failed")))
                .collect(),
            None => failures,
        };

        let status = if failures.is_empty() {
            OutcomeStatus::Passed
        } else if scenario.stability.is_flaky() {
            OutcomeStatus::FlakyFailed
        } else {
            OutcomeStatus::Failed
        };

        ScenarioOutcome {
            key: scenario.key.to_string(),
            title: scenario.title.to_string(),
            operation: scenario.operation(),
            status,
            failures,
            exchange: Some(exchange),
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}

fn skipped(scenario: &Scenario) -> ScenarioOutcome {
    ScenarioOutcome {
        key: scenario.key.to_string(),
        title: scenario.title.to_string(),
        operation: scenario.operation(),
        status: OutcomeStatus::Skipped,
        failures: Vec::new(),
        exchange: None,
        duration_ms: 0,
    }
}

/// `"  t03 GET /brandsList: OK (182 ms)"`
fn progress_line(outcome: &ScenarioOutcome) -> String {
    let head = format!("  {} {}", outcome.key, outcome.operation);
    match outcome.status {
        OutcomeStatus::Passed => format!("{head}: OK ({} ms)", outcome.duration_ms),
        OutcomeStatus::Skipped => format!("{head}: skipped"),
        OutcomeStatus::Failed => format!(
            "{head}: {} failures ({} ms)",
            outcome.failures.len(),
            outcome.duration_ms
        ),
        OutcomeStatus::FlakyFailed => format!(
            "{head}: {} failures, known flaky ({} ms)",
            outcome.failures.len(),
            outcome.duration_ms
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: OutcomeStatus, failures: usize) -> ScenarioOutcome {
        let scenario = Suite::standard().get("t12").cloned().unwrap();
        let mut o = skipped(&scenario);
        o.status = status;
        o.duration_ms = 15;
        o.failures = (0..failures)
            .map(|_| {
                Failure::new(
                    "t12",
                    FailureType::StatusMismatch,
                    "responseCode 200",
                    "responseCode 404",
                    RequestSnapshot {
                        method: "DELETE".into(),
                        url: "http://localhost/api/deleteAccount".into(),
                        params: shopcheck_core::params::RequestParams::new(),
                        placement: shopcheck_core::scenario::ParamPlacement::Query,
                    },
                )
            })
            .collect();
        o
    }

    #[test]
    fn progress_lines() {
        assert_eq!(
            progress_line(&outcome(OutcomeStatus::Passed, 0)),
            "  t12 DELETE /deleteAccount: OK (15 ms)"
        );
        assert_eq!(
            progress_line(&outcome(OutcomeStatus::FlakyFailed, 2)),
            "  t12 DELETE /deleteAccount: 2 failures, known flaky (15 ms)"
        );
        assert_eq!(
            progress_line(&outcome(OutcomeStatus::Skipped, 0)),
            "  t12 DELETE /deleteAccount: skipped"
        );
    }

    #[test]
    fn skipped_outcome_has_no_exchange() {
        let scenario = Suite::standard().get("t01").cloned().unwrap();
        let o = skipped(&scenario);
        assert_eq!(o.status, OutcomeStatus::Skipped);
        assert!(o.exchange.is_none());
        assert_eq!(o.operation, "GET /productsList");
    }
}
