//! Extraction of values from probe responses.
//!
//! [`extract_data`] reads one value out of a [`ProbeResponse`] for a given
//! [`Source`] and expression. It never fails: problems are logged and turn
//! into `None`. [`try_extract`] exposes the same logic with typed errors.
//!
//! Body expressions come in three forms:
//!
//! - `$.a.b[0].c`: a path expression (see [`path`])
//! - `/pattern/`: a regular expression run against the body text; the first
//!   capture group wins, otherwise the whole match
//! - `a.b.c`: a plain property path into an object body
//!
//! # Examples
//!
//! ```
//! use api_probe::extract::extract_data;
//! use api_probe::models::{ProbeResponse, Source};
//! use serde_json::json;
//!
//! let response = ProbeResponse::new(200)
//!     .with_header("X-Request-Id", "req-1")
//!     .with_data(json!({"user": {"id": 7}}));
//!
//! assert_eq!(extract_data(&response, &Source::Body, "$.user.id"), Some(json!(7)));
//! assert_eq!(extract_data(&response, &Source::Header, "x-request-id"), Some(json!("req-1")));
//! assert_eq!(extract_data(&response, &Source::Status, ""), Some(json!(200)));
//! ```

pub mod path;

use log::{error, warn};
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::models::response::ProbeResponse;
use crate::models::step::Source;

pub use path::{evaluate_path, get_nested_property};

/// Errors raised while extracting a value.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The source tag is not one the engine understands.
    #[error("unsupported data source: {0}")]
    UnsupportedSource(String),

    /// A regular expression in the expression did not compile.
    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The body could not be turned into text.
    #[error("failed to serialize response body: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Extracts a value from a response, logging and swallowing any failure.
pub fn extract_data(response: &ProbeResponse, source: &Source, expression: &str) -> Option<Value> {
    match try_extract(response, source, expression) {
        Ok(value) => value,
        Err(ExtractError::UnsupportedSource(tag)) => {
            warn!("unsupported data source '{}' (expression: {:?})", tag, expression);
            None
        }
        Err(err) => {
            error!(
                "data extraction failed: {} (source: {}, expression: {:?})",
                err, source, expression
            );
            None
        }
    }
}

/// Extracts a value from a response.
///
/// `Ok(None)` means the value is simply not there.
pub fn try_extract(
    response: &ProbeResponse,
    source: &Source,
    expression: &str,
) -> Result<Option<Value>, ExtractError> {
    match source {
        Source::Status => Ok(Some(Value::from(response.status))),
        Source::Body => extract_from_body(&response.data, expression),
        Source::Header => Ok(extract_from_headers(response, expression)),
        Source::Cookie => extract_from_cookies(response, expression),
        Source::Url => Ok(Some(Value::String(response.url.clone().unwrap_or_default()))),
        Source::Time => Ok(Some(Value::from(response.duration.unwrap_or(0)))),
        Source::Size => calculate_response_size(response).map(|size| Some(Value::from(size))),
        Source::Unsupported(tag) => Err(ExtractError::UnsupportedSource(tag.clone())),
    }
}

/// Extracts a value from a response body.
///
/// An empty expression returns the body itself.
pub fn extract_from_body(body: &Value, expression: &str) -> Result<Option<Value>, ExtractError> {
    if expression.is_empty() {
        return Ok(Some(body.clone()));
    }

    if expression.starts_with("$.") {
        return Ok(evaluate_path(body, expression));
    }

    if let Some(pattern) = regex_literal(expression) {
        return extract_with_regex(body, pattern);
    }

    match body {
        Value::Object(_) | Value::Array(_) => Ok(get_nested_property(body, expression)),
        _ => Ok(None),
    }
}

/// Returns the inner pattern of a `/pattern/` expression.
fn regex_literal(expression: &str) -> Option<&str> {
    if !(expression.starts_with('/') && expression.ends_with('/')) {
        return None;
    }
    if expression.len() < 2 {
        return Some("");
    }
    Some(&expression[1..expression.len() - 1])
}

fn compile(pattern: &str) -> Result<Regex, ExtractError> {
    Regex::new(pattern).map_err(|source| ExtractError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

fn extract_with_regex(body: &Value, pattern: &str) -> Result<Option<Value>, ExtractError> {
    let regex = compile(pattern)?;
    let text = match body {
        Value::String(text) => text.clone(),
        other => serde_json::to_string(other)?,
    };

    let value = regex.captures(&text).and_then(|caps| {
        caps.get(1)
            .filter(|group| !group.as_str().is_empty())
            .or_else(|| caps.get(0))
            .map(|m| Value::String(m.as_str().to_string()))
    });

    Ok(value)
}

/// Looks up a header by name (case-insensitive).
fn extract_from_headers(response: &ProbeResponse, name: &str) -> Option<Value> {
    if name.is_empty() {
        return None;
    }
    response.header(name).map(|header| header.to_json())
}

/// Finds the value of a cookie in the `set-cookie` header(s).
fn extract_from_cookies(
    response: &ProbeResponse,
    name: &str,
) -> Result<Option<Value>, ExtractError> {
    if name.is_empty() {
        return Ok(None);
    }
    let Some(header) = response.header("set-cookie") else {
        return Ok(None);
    };

    let regex = compile(&format!("{}=([^;]+)", regex::escape(name)))?;

    Ok(header
        .values()
        .find_map(|cookie| regex.captures(cookie))
        .and_then(|caps| caps.get(1))
        .map(|m| Value::String(m.as_str().to_string())))
}

/// Returns the response size in bytes.
///
/// Uses `content-length` when it is present and starts with digits,
/// otherwise the byte length of the body text.
fn calculate_response_size(response: &ProbeResponse) -> Result<u64, ExtractError> {
    let declared = response
        .header("content-length")
        .and_then(|header| header.first())
        .and_then(parse_leading_integer);

    if let Some(size) = declared {
        return Ok(size);
    }

    Ok(response.body_as_string()?.len() as u64)
}

fn parse_leading_integer(text: &str) -> Option<u64> {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
