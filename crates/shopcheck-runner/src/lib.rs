//! shopcheck-runner: blocking HTTP client and ordered scenario engine

pub mod checks;
pub mod client;
pub mod hooks;
pub mod suite;

pub use client::{ApiClient, ClientError, RawResponse};
pub use hooks::{RecordingHook, ReportHook, TracingHook};
pub use suite::{RunError, ScenarioContext, SuiteRunner};
