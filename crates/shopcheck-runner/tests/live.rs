//! Runs the standard suite against the public service.
//!
//! `cargo test -p shopcheck-runner --test live -- --ignored`

use shopcheck_core::scenario::Suite;
use shopcheck_core::verdict::VerdictPolicy;
use shopcheck_core::Config;
use shopcheck_runner::{SuiteRunner, TracingHook};

#[test]
#[ignore = "needs network access to automationexercise.com"]
fn standard_suite_against_live_service() {
    let report = SuiteRunner::from_config(&Config::default())
        .with_progress(true)
        .with_hook(TracingHook)
        .run(&Suite::standard())
        .unwrap();

    let failures = report.failures();
    let verdict = VerdictPolicy::default().verdict(&failures, report.executed(), report.skipped());
    assert_eq!(verdict.exit_code, 0, "{}\n{failures:#?}", verdict.reason);
}
