//! HTTP request data models.
//!
//! `HttpMethod` is shared by step definitions and by the prepared request
//! handed to an HTTP executor. `RequestConfig` is the post-substitution
//! request: every variable token that could be resolved has been replaced.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Header names whose values are masked when a request is recorded.
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "proxy-authorization",
    "cookie",
    "x-api-key",
    "api-key",
    "token",
    "auth-token",
    "x-auth-token",
    "access-token",
    "x-access-token",
];

/// Replacement for masked header values.
pub const MASKED_VALUE: &str = "******";

/// HTTP request method.
///
/// Parsed case-insensitively from step definitions and always serialized in
/// upper case. Methods outside the supported set are kept as
/// [`HttpMethod::Other`] so that only the step using them fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HttpMethod {
    /// HTTP GET method - retrieve a resource
    #[default]
    GET,
    /// HTTP POST method - submit data to create a resource
    POST,
    /// HTTP PUT method - replace a resource
    PUT,
    /// HTTP DELETE method - remove a resource
    DELETE,
    /// HTTP PATCH method - partially modify a resource
    PATCH,
    /// HTTP OPTIONS method - describe communication options
    OPTIONS,
    /// HTTP HEAD method - retrieve headers only
    HEAD,
    /// Any other method, upper-cased.
    Other(String),
}

impl HttpMethod {
    /// Returns the string representation of the HTTP method.
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::Other(method) => method.as_str(),
        }
    }

    /// Parses a string into a supported HttpMethod.
    ///
    /// # Returns
    ///
    /// `Some(HttpMethod)` if the string is a supported HTTP method, `None` otherwise.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            "HEAD" => Some(HttpMethod::HEAD),
            _ => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, HttpMethod::Other(_))
    }
}

impl From<String> for HttpMethod {
    fn from(value: String) -> Self {
        HttpMethod::parse(&value).unwrap_or_else(|| HttpMethod::Other(value.trim().to_uppercase()))
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A request ready to be handed to an HTTP executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// HTTP method.
    pub method: HttpMethod,

    /// Target URL after variable substitution.
    pub url: String,

    /// Request headers after variable substitution.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Request body after variable substitution.
    ///
    /// A JSON string is sent verbatim, any other JSON value is sent as a
    /// JSON document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Query parameters collected from the step's URL parameters.
    ///
    /// `None` when the step declares no usable parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, String>>,
}

impl RequestConfig {
    /// Creates a request with no headers, body or parameters.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            data: None,
            params: None,
        }
    }

    /// Gets a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a copy with the values of [`SENSITIVE_HEADERS`] masked.
    ///
    /// Used for the request kept in step results; the executor always
    /// receives the unmasked request.
    pub fn sanitized(&self) -> Self {
        let headers = self
            .headers
            .iter()
            .map(|(name, value)| {
                let sensitive = SENSITIVE_HEADERS
                    .iter()
                    .any(|sensitive| name.eq_ignore_ascii_case(sensitive));
                let value = if sensitive {
                    MASKED_VALUE.to_string()
                } else {
                    value.clone()
                };
                (name.clone(), value)
            })
            .collect();

        Self {
            headers,
            ..self.clone()
        }
    }
}
