//! Ordered request parameters (query string or form body)

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameter names whose values never leave the process unmasked.
const SENSITIVE_PARAMS: &[&str] = &["password"];

/// Mask value for redacted parameters.
pub const MASK: &str = "***";

/// Ordered `name → value` parameters.
///
/// Insertion order is the wire order. Re-inserting a name replaces the value
/// in place, so the last write wins without moving the entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RequestParams(Vec<(String, String)>);

impl RequestParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Copy with sensitive values replaced by [`MASK`].
    #[must_use]
    pub fn masked(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|(k, v)| {
                    if is_sensitive_param(k) {
                        (k.clone(), MASK.to_string())
                    } else {
                        (k.clone(), v.clone())
                    }
                })
                .collect(),
        )
    }

    /// Pairs in wire order, for `reqwest`'s `query`/`form`.
    #[must_use]
    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

fn is_sensitive_param(name: &str) -> bool {
    SENSITIVE_PARAMS.iter().any(|&p| name.eq_ignore_ascii_case(p))
}
