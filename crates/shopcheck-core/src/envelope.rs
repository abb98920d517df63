//! Response envelope extraction
//!
//! The storefront API answers with a JSON envelope (`responseCode`, `message`,
//! payload). Success paths send it as a bare JSON document; several error paths
//! send an HTML page whose `<body>` holds the same JSON as text. Both shapes are
//! real, so extraction is a two-path dispatcher: bare JSON first, then the
//! embedded body text.

use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static BODY_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body[^>]*>(.*?)</body\s*>").expect("static regex"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("static regex"));

/// Characters of body text kept in error previews.
const PREVIEW_CHARS: usize = 200;

/// Which path produced the JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BodyShape {
    /// Whole body parsed as JSON
    BareJson,
    /// JSON text found inside an HTML document's body
    HtmlEmbedded,
}

/// Result of [`extract_json`].
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub value: Value,
    pub shape: BodyShape,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("response body is empty")]
    Empty,
    #[error("response body is not JSON: {preview}")]
    NotJson { preview: String },
    #[error("HTML body does not contain JSON: {preview}")]
    EmbeddedNotJson { preview: String },
}

/// Parse the JSON envelope out of a raw response body.
///
/// # Errors
///
/// Returns [`ExtractError`] when neither the bare body nor the embedded
/// HTML body text parses as JSON.
pub fn extract_json(raw: &str) -> Result<Extracted, ExtractError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::Empty);
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(Extracted {
            value,
            shape: BodyShape::BareJson,
        });
    }

    let inner = match BODY_ELEMENT.captures(trimmed).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        // Tag soup without a body element: try the whole document's text.
        None if trimmed.starts_with('<') => trimmed,
        None => {
            return Err(ExtractError::NotJson {
                preview: preview(trimmed),
            });
        }
    };

    let text = decode_entities(&TAG.replace_all(inner, ""));
    let text = text.trim();
    serde_json::from_str::<Value>(text)
        .map(|value| Extracted {
            value,
            shape: BodyShape::HtmlEmbedded,
        })
        .map_err(|_| ExtractError::EmbeddedNotJson {
            preview: preview(text),
        })
}

/// Decode the handful of entities an HTML serializer emits for JSON text.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        // Last, so "&amp;lt;" decodes to "&lt;" and not "<"
        .replace("&amp;", "&")
}

/// First [`PREVIEW_CHARS`] characters, for diagnostics.
#[must_use]
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => format!("{}…", &text[..end]),
        None => text.to_string(),
    }
}

/// Values reached by a dotted path, projecting through arrays.
///
/// `products.name` on `{"products": [{"name": "a"}, {"name": "b"}]}` yields
/// both names.
#[must_use]
pub fn select<'a>(value: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![value];
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        let mut next = Vec::new();
        for v in current {
            match v {
                Value::Array(items) => {
                    next.extend(items.iter().filter_map(|item| item.get(segment)));
                }
                Value::Object(map) => {
                    if let Some(child) = map.get(segment) {
                        next.push(child);
                    }
                }
                _ => {}
            }
        }
        current = next;
    }
    current
}

/// Display text of a JSON value: strings unquoted, everything else as JSON.
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The service's response envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Envelope {
    #[serde(rename = "responseCode", default, skip_serializing_if = "Option::is_none")]
    pub response_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brands: Option<Vec<Brand>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDetail>,
}

impl Envelope {
    /// Build leniently: a payload of an unexpected type is dropped, not fatal.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        fn field<T: serde::de::DeserializeOwned>(value: &Value, key: &str) -> Option<T> {
            value
                .get(key)
                .and_then(|v| serde_json::from_value(v.clone()).ok())
        }

        let response_code = value.get("responseCode").and_then(|v| match v {
            Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });

        Self {
            response_code,
            message: value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            products: field(value, "products"),
            brands: field(value, "brands"),
            user: field(value, "user"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Product {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Brand {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub brand: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UserDetail {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub birth_day: Option<Value>,
    #[serde(default)]
    pub birth_month: Option<Value>,
    #[serde(default)]
    pub birth_year: Option<Value>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub zipcode: Option<String>,
}
