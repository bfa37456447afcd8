//! HTTP request execution error types.
//!
//! This module defines the errors an HTTP executor reports back to the step
//! engine, including network errors, timeouts, and protocol issues.

use thiserror::Error;

/// Errors that can occur during HTTP request execution.
///
/// Any of these aborts the current step; the message ends up in the step
/// result's `error` field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Network error occurred during request execution.
    ///
    /// This includes connection failures, DNS resolution errors,
    /// and other network-level issues.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out before completion.
    #[error("Request timed out")]
    Timeout,

    /// Invalid URL provided in the request.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// TLS/SSL error occurred during HTTPS connection.
    #[error("TLS/SSL error: {0}")]
    TlsError(String),

    /// Request building error, such as an invalid header name or value.
    #[error("Request build error: {0}")]
    BuildError(String),

    /// Only HTTP and HTTPS are supported.
    #[error("Unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    /// Failure reported by a caller-supplied executor.
    #[error("{0}")]
    Other(String),
}

/// Convert reqwest errors to RequestError.
#[cfg(feature = "native")]
impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        let text = err.to_string();
        if err.is_timeout() {
            RequestError::Timeout
        } else if err.is_builder() {
            RequestError::BuildError(text)
        } else if text.contains("certificate") || text.contains("TLS") || text.contains("SSL") {
            RequestError::TlsError(text)
        } else if err.is_connect() {
            RequestError::NetworkError(format!("Connection failed: {}", text))
        } else {
            RequestError::NetworkError(text)
        }
    }
}

/// Convert URL parsing errors to RequestError.
impl From<url::ParseError> for RequestError {
    fn from(err: url::ParseError) -> Self {
        RequestError::InvalidUrl(err.to_string())
    }
}
