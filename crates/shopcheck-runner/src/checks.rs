//! Response checks for one scenario
//!
//! No I/O. Order: response time, pinned HTTP status, envelope extraction,
//! `responseCode`, then each content signal. When the body yields no JSON the
//! content checks are skipped and a single malformed-response failure stands
//! in for them.

use std::time::Duration;

use serde_json::Value;

use shopcheck_core::envelope::{self, BodyShape, Envelope, extract_json, select, value_text};
use shopcheck_core::fixture::UserAccount;
use shopcheck_core::scenario::{Scenario, Signal, Stability};
use shopcheck_core::verdict::{Failure, FailureType, RequestSnapshot, ResponseSnapshot};

use crate::client::RawResponse;

/// Bodies longer than this are truncated in snapshots.
const MAX_BODY_BYTES: usize = 4096;

/// Input for the checks: pure data.
pub struct CheckInput<'a> {
    pub scenario: &'a Scenario,
    pub account: &'a UserAccount,
    pub request: &'a RequestSnapshot,
    pub response: &'a RawResponse,
    pub max_response_time_ms: u64,
}

/// Outcome of the checks.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Unmet expectations, already downgraded for known-flaky scenarios
    pub failures: Vec<Failure>,
    pub snapshot: ResponseSnapshot,
    pub envelope: Option<Envelope>,
}

/// Run every check against one response.
#[must_use]
pub fn evaluate(input: &CheckInput) -> Evaluation {
    let raw = input.response;
    let expect = &input.scenario.expect;

    let extracted = extract_json(&raw.body);
    let snapshot = ResponseSnapshot {
        status_code: raw.status,
        content_type: raw.content_type.clone(),
        body: stored_body(&raw.body),
        latency_ms: raw.elapsed_ms(),
        shape: extracted.as_ref().ok().map(|e| e.shape),
    };

    let mut failures = Vec::new();
    let mut fail = |failure_type: FailureType, expected: String, actual: String| {
        failures.push(
            Failure::new(
                input.scenario.key,
                failure_type,
                expected,
                actual,
                input.request.clone(),
            )
            .with_path(input.scenario.path)
            .with_response(snapshot.clone()),
        );
    };

    // ── Check 1: response time ceiling (strictly below) ──
    if raw.elapsed >= Duration::from_millis(input.max_response_time_ms) {
        fail(
            FailureType::ResponseTimeExceeded,
            format!("< {} ms", input.max_response_time_ms),
            format!("{} ms", raw.elapsed_ms()),
        );
    }

    // ── Check 2: transport status, where pinned ──
    if let Some(status) = expect.http_status {
        if raw.status != status {
            fail(
                FailureType::StatusMismatch,
                format!("HTTP {status}"),
                format!("HTTP {}", raw.status),
            );
        }
    }

    // ── Check 3: envelope extraction ──
    let extracted = match extracted {
        Ok(extracted) => extracted,
        Err(e) => {
            fail(
                FailureType::MalformedResponse,
                "JSON envelope (bare or inside the HTML body)".to_string(),
                e.to_string(),
            );
            return finish(input.scenario, failures, snapshot, None);
        }
    };
    let env = Envelope::from_value(&extracted.value);

    // ── Check 4: responseCode ──
    if env.response_code != Some(expect.response_code) {
        fail(
            FailureType::StatusMismatch,
            format!("responseCode {}", expect.response_code),
            env.response_code
                .map_or_else(|| "no responseCode".to_string(), |c| format!("responseCode {c}")),
        );
    }

    // ── Check 5: content signals ──
    for signal in &expect.signals {
        if let Some(actual) = check_signal(signal, input, &extracted.value, extracted.shape, &env) {
            fail(
                FailureType::ContentMismatch,
                signal.describe(Some(input.account)),
                actual,
            );
        }
    }

    finish(input.scenario, failures, snapshot, Some(env))
}

/// `None` when the signal holds, otherwise what was found instead.
fn check_signal(
    signal: &Signal,
    input: &CheckInput,
    value: &Value,
    shape: BodyShape,
    env: &Envelope,
) -> Option<String> {
    match signal {
        Signal::Message(expected) => match env.message.as_deref() {
            Some(m) if m == *expected => None,
            Some(m) => Some(format!("message = {m:?}")),
            None => Some("no message".to_string()),
        },
        Signal::Shape(kind) => {
            let violations = kind.violations(value);
            (!violations.is_empty()).then(|| violations.join("; "))
        }
        Signal::AnyContains { path, needle } => {
            let found: Vec<String> = select(value, path).into_iter().map(value_text).collect();
            if found.iter().any(|v| v.contains(needle)) {
                None
            } else if found.is_empty() {
                Some(format!("nothing at {path}"))
            } else {
                Some(format!("{path} = {}", preview_list(&found)))
            }
        }
        Signal::Equals { path, expected } => {
            let expected = expected.resolve(input.account);
            match select(value, path).first() {
                Some(v) if value_text(v) == expected => None,
                Some(v) => Some(format!("{path} = {:?}", value_text(v))),
                None => Some(format!("nothing at {path}")),
            }
        }
        Signal::RawContains(needle) => {
            // An HTML-wrapped body escapes its quotes; compare the decoded JSON too.
            let decoded = match shape {
                BodyShape::BareJson => false,
                BodyShape::HtmlEmbedded => value.to_string().contains(needle),
            };
            if input.response.body.contains(needle) || decoded {
                None
            } else {
                Some(format!("body = {}", envelope::preview(&input.response.body)))
            }
        }
    }
}

fn finish(
    scenario: &Scenario,
    failures: Vec<Failure>,
    snapshot: ResponseSnapshot,
    envelope: Option<Envelope>,
) -> Evaluation {
    Evaluation {
        failures: downgrade_if_flaky(scenario, failures),
        snapshot,
        envelope,
    }
}

/// Known-flaky scenarios keep their failures, as warnings.
pub(crate) fn downgrade_if_flaky(scenario: &Scenario, failures: Vec<Failure>) -> Vec<Failure> {
    match &scenario.stability {
        Stability::Stable => failures,
        Stability::KnownFlaky { reason } => failures
            .into_iter()
            .map(|f| f.known_flaky(reason))
            .collect(),
    }
}

fn preview_list(values: &[String]) -> String {
    const SHOWN: usize = 5;
    let head: Vec<String> = values.iter().take(SHOWN).map(|v| format!("{v:?}")).collect();
    if values.len() > SHOWN {
        format!("[{}, … {} more]", head.join(", "), values.len() - SHOWN)
    } else {
        format!("[{}]", head.join(", "))
    }
}

fn stored_body(body: &str) -> Option<String> {
    if body.is_empty() {
        None
    } else if body.len() <= MAX_BODY_BYTES {
        Some(body.to_string())
    } else {
        let mut end = MAX_BODY_BYTES;
        while end > 0 && !body.is_char_boundary(end) {
            end -= 1;
        }
        Some(format!("{}…({} bytes total)", &body[..end], body.len()))
    }
}
