//! shopcheck-core: scenario table, fixtures and verdict logic for the
//! storefront API suite
//!
//! This crate holds everything that does not touch the network: the
//! configuration, the per-run account, the scenario table and its
//! expectations, envelope extraction, failures with their severities, and
//! the report/dump/reproduction formats.

pub mod clock;
pub mod config;
pub mod dryrun;
pub mod dump;
pub mod envelope;
pub mod fixture;
pub mod generator;
pub mod params;
pub mod report;
pub mod scenario;
pub mod verdict;

pub use config::{Config, ConfigError, LoginFixture, StaleAccount};
pub use dryrun::SuitePlan;
pub use dump::{DumpError, DumpIndex};
pub use envelope::{BodyShape, Envelope, ExtractError, Extracted, extract_json};
pub use fixture::{AccountField, RunTag, UserAccount};
pub use generator::to_http_file;
pub use params::RequestParams;
pub use report::{Exchange, OutcomeStatus, ScenarioOutcome, SuiteReport};
pub use scenario::{Method, Scenario, Signal, Stability, Suite, SuiteError};
pub use verdict::{
    Failure, FailureType, RequestSnapshot, ResponseSnapshot, Severity, Verdict, VerdictPolicy,
    VerdictStatus,
};
