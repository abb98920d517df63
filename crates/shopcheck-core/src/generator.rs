//! HTTP file generator - converts failures to .http format

use crate::scenario::ParamPlacement;
use crate::verdict::{Failure, RequestSnapshot};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Generate .http file content from failures
#[must_use]
pub fn to_http_file(failures: &[Failure], base_url_var: &str) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "# Auto-generated reproduction cases ({} failures)",
        failures.len()
    ));
    lines.push(format!("# Base URL variable: {{{{{base_url_var}}}}}"));
    lines.push(String::new());

    for (idx, failure) in failures.iter().enumerate() {
        let status = failure
            .status_code
            .map_or_else(|| "no response".to_string(), |s| s.to_string());
        lines.push(format!(
            "### [{idx}] {} - {} ({status})",
            failure.severity, failure.failure_type
        ));
        lines.push(format!("# Scenario: {}", failure.scenario));
        lines.push(format!("# Expected: {}", failure.expected));
        lines.push(format!("# Actual: {}", failure.actual));

        let mut request = failure.request.clone();
        if !request.url.starts_with("http") {
            request.url = format!("{{{{{base_url_var}}}}}{}", request.url);
        }
        lines.push(request_to_http(&request, None));

        lines.push(String::new());
        lines.push("###".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Generate a single request as .http format
#[must_use]
pub fn request_to_http(request: &RequestSnapshot, comment: Option<&str>) -> String {
    let mut lines = Vec::new();

    if let Some(c) = comment {
        lines.push(format!("### {c}"));
    }

    let encoded = form_encode(request);
    match request.placement {
        ParamPlacement::Query if !request.params.is_empty() => {
            let sep = if request.url.contains('?') { '&' } else { '?' };
            lines.push(format!("{} {}{sep}{encoded}", request.method, request.url));
        }
        ParamPlacement::Query => lines.push(format!("{} {}", request.method, request.url)),
        ParamPlacement::Form => {
            lines.push(format!("{} {}", request.method, request.url));
            if !request.params.is_empty() {
                lines.push(format!("Content-Type: {FORM_CONTENT_TYPE}"));
                lines.push(String::new());
                lines.push(encoded);
            }
        }
    }

    lines.join("\n")
}

fn form_encode(request: &RequestSnapshot) -> String {
    request
        .params
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// `application/x-www-form-urlencoded` byte serializer.
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'*' => {
                out.push(char::from(byte));
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
