//! HTTP response data models.
//!
//! `ProbeResponse` is what an HTTP executor hands back to the step engine:
//! the status code, the response headers, the decoded body and, when the
//! executor knows them, the elapsed time and the effective URL.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Value of a single response header.
///
/// Most headers carry one value. Headers the server repeats (notably
/// `set-cookie`) are folded into a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    /// A header sent once.
    Single(String),
    /// A header sent several times.
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// Iterates over every value of the header.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let values: Vec<&str> = match self {
            HeaderValue::Single(value) => vec![value.as_str()],
            HeaderValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        };
        values.into_iter()
    }

    /// Returns the first value of the header, if any.
    pub fn first(&self) -> Option<&str> {
        self.values().next()
    }

    /// Converts the header into a JSON value.
    pub fn to_json(&self) -> Value {
        match self {
            HeaderValue::Single(value) => Value::String(value.clone()),
            HeaderValue::Multiple(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
        }
    }

    fn push(&mut self, value: String) {
        match self {
            HeaderValue::Single(existing) => {
                *self = HeaderValue::Multiple(vec![std::mem::take(existing), value]);
            }
            HeaderValue::Multiple(values) => values.push(value),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Single(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::Single(value)
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        HeaderValue::Multiple(values)
    }
}

/// Represents an HTTP response returned by an HTTP executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResponse {
    /// HTTP status code (e.g., 200, 404, 500).
    pub status: u16,

    /// Response headers keyed by the name the server sent.
    #[serde(default)]
    pub headers: HashMap<String, HeaderValue>,

    /// Decoded response body.
    ///
    /// JSON bodies are kept as parsed JSON; anything else is a JSON string.
    #[serde(default)]
    pub data: Value,

    /// Elapsed time in milliseconds, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,

    /// Effective request URL, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ProbeResponse {
    /// Creates a new response with the given status and an empty body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            data: Value::Null,
            duration: None,
            url: None,
        }
    }

    /// Sets the body, consuming and returning the response.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Adds a header, consuming and returning the response.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_header(name.into(), value.into());
        self
    }

    /// Adds a header value.
    ///
    /// A second value for a name already present (compared
    /// case-insensitively) turns the entry into a list.
    pub fn add_header(&mut self, name: String, value: String) {
        let existing = self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
            .map(|(_, v)| v);

        match existing {
            Some(header) => header.push(value),
            None => {
                self.headers.insert(name, HeaderValue::Single(value));
            }
        }
    }

    /// Gets a header by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Returns the body as text.
    ///
    /// String bodies are returned as-is, anything else is serialized as
    /// compact JSON.
    pub fn body_as_string(&self) -> Result<String, serde_json::Error> {
        match &self.data {
            Value::String(text) => Ok(text.clone()),
            other => serde_json::to_string(other),
        }
    }

    /// Returns the headers as a JSON object.
    pub fn headers_json(&self) -> Value {
        Value::Object(
            self.headers
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}
