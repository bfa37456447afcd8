//! Step definitions as persisted in probe task configuration.
//!
//! The wire shape follows the dashboard's task editor: camelCase keys, with
//! `step_id` and `fail_fast` keeping their snake_case spellings.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::request::HttpMethod;

/// Where in a response a value is read from.
///
/// Unknown tags are kept in `Unsupported` so a stored step definition still
/// loads; extracting from such a source yields no value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Source {
    /// The HTTP status code.
    Status,
    /// The response body.
    Body,
    /// A response header (`header` or `headers`).
    Header,
    /// A cookie set through `set-cookie`.
    Cookie,
    /// The effective request URL.
    Url,
    /// The response time in milliseconds.
    Time,
    /// The response size in bytes.
    Size,
    /// A tag this engine does not know.
    Unsupported(String),
}

impl Source {
    /// Returns the canonical tag of the source.
    pub fn as_str(&self) -> &str {
        match self {
            Source::Status => "status",
            Source::Body => "body",
            Source::Header => "header",
            Source::Cookie => "cookie",
            Source::Url => "url",
            Source::Time => "time",
            Source::Size => "size",
            Source::Unsupported(tag) => tag,
        }
    }
}

impl From<String> for Source {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "status" => Source::Status,
            "body" => Source::Body,
            "header" | "headers" => Source::Header,
            "cookie" => Source::Cookie,
            "url" => Source::Url,
            "time" => Source::Time,
            "size" => Source::Size,
            _ => Source::Unsupported(tag),
        }
    }
}

impl From<&str> for Source {
    fn from(tag: &str) -> Self {
        Source::from(tag.to_string())
    }
}

impl From<Source> for String {
    fn from(source: Source) -> Self {
        source.as_str().to_string()
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison applied by an assertion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    Regex,
    Exists,
    NotExists,
    /// An operator this engine does not know; always fails.
    Unsupported(String),
}

impl Operator {
    /// Returns the canonical tag of the operator.
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::Regex => "regex",
            Operator::Exists => "exists",
            Operator::NotExists => "not_exists",
            Operator::Unsupported(tag) => tag,
        }
    }
}

impl From<String> for Operator {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "equals" => Operator::Equals,
            "not_equals" => Operator::NotEquals,
            "contains" => Operator::Contains,
            "not_contains" => Operator::NotContains,
            "greater_than" => Operator::GreaterThan,
            "less_than" => Operator::LessThan,
            "regex" => Operator::Regex,
            "exists" => Operator::Exists,
            "not_exists" => Operator::NotExists,
            _ => Operator::Unsupported(tag),
        }
    }
}

impl From<&str> for Operator {
    fn from(tag: &str) -> Self {
        Operator::from(tag.to_string())
    }
}

impl From<Operator> for String {
    fn from(operator: Operator) -> Self {
        operator.as_str().to_string()
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declares a variable to pull out of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionDescriptor {
    /// Variable name, with or without the leading `$`.
    pub name: String,
    pub source: Source,
    /// Source-specific expression (path, regex, header or cookie name).
    #[serde(default)]
    pub expression: String,
}

impl ExtractionDescriptor {
    pub fn new(name: impl Into<String>, source: Source, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source,
            expression: expression.into(),
        }
    }
}

/// Declares a pass/fail check against a response value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionDescriptor {
    pub source: Source,
    #[serde(default)]
    pub expression: String,
    pub operator: Operator,
    /// Expected value; may itself contain variable tokens.
    #[serde(default)]
    pub expected: Value,
}

impl AssertionDescriptor {
    pub fn new(
        source: Source,
        expression: impl Into<String>,
        operator: Operator,
        expected: impl Into<Value>,
    ) -> Self {
        Self {
            source,
            expression: expression.into(),
            operator,
            expected: expected.into(),
        }
    }
}

/// One query parameter of a step's request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlParameter {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// The request template of a step, before variable substitution.
///
/// A missing URL or an unsupported method fails the step when it runs, not
/// the task that contains it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepRequest {
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl StepRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }
}

/// One HTTP request plus its extraction and assertion rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    #[serde(rename = "step_id", default)]
    pub step_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub request: StepRequest,

    #[serde(rename = "urlParameters", default)]
    pub url_parameters: Vec<UrlParameter>,

    /// Extraction descriptors, run in declaration order.
    #[serde(default)]
    pub variables: Vec<ExtractionDescriptor>,

    /// Assertion descriptors, run in declaration order.
    #[serde(default)]
    pub assertions: Vec<AssertionDescriptor>,

    /// Stop the surrounding sequence when this step fails.
    #[serde(rename = "fail_fast", alias = "failFast", default)]
    pub fail_fast: bool,
}

impl StepDefinition {
    /// Creates a step with no parameters, extractions or assertions.
    pub fn new(step_id: impl Into<String>, name: impl Into<String>, request: StepRequest) -> Self {
        Self {
            step_id: step_id.into(),
            name: name.into(),
            request,
            url_parameters: Vec::new(),
            variables: Vec::new(),
            assertions: Vec::new(),
            fail_fast: false,
        }
    }
}
