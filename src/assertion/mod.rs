//! Assertion evaluation.
//!
//! [`validate`] compares an actual value against an expected one with an
//! [`Operator`] and always returns a [`ValidationOutcome`]; a malformed
//! assertion produces a failed outcome, never an error.
//!
//! Equality and containment compare the text form of both sides (see
//! [`value_to_string`]), so the number `200` equals the string `"200"`.
//! `greater_than` and `less_than` coerce both sides to numbers and fail when
//! either side is not numeric.
//!
//! # Examples
//!
//! ```
//! use api_probe::assertion::validate;
//! use api_probe::models::Operator;
//! use serde_json::json;
//!
//! let outcome = validate(Some(&json!("10")), &Operator::GreaterThan, &json!("5"));
//! assert!(outcome.success);
//!
//! let outcome = validate(Some(&json!(200)), &Operator::Equals, &json!("201"));
//! assert!(!outcome.success);
//! assert_eq!(outcome.message, "expected 201, got 200");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::step::Operator;
use crate::variables::value::{optional_value_to_string, to_number, value_to_string};

/// Errors raised while evaluating an assertion.
#[derive(Debug, Error)]
pub enum AssertionError {
    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result of one assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub success: bool,
    pub message: String,
    /// The extracted value; `None` when nothing was extracted.
    pub actual_value: Option<Value>,
    pub expected_value: Value,
    pub operator: Operator,
}

/// Evaluates `actual <operator> expected`.
pub fn validate(actual: Option<&Value>, operator: &Operator, expected: &Value) -> ValidationOutcome {
    let (success, message) = match evaluate(actual, operator, expected) {
        Ok(verdict) => verdict,
        Err(err) => (false, format!("assertion evaluation failed: {}", err)),
    };

    ValidationOutcome {
        success,
        message,
        actual_value: actual.cloned(),
        expected_value: expected.clone(),
        operator: operator.clone(),
    }
}

fn evaluate(
    actual: Option<&Value>,
    operator: &Operator,
    expected: &Value,
) -> Result<(bool, String), AssertionError> {
    let actual_text = optional_value_to_string(actual);
    let expected_text = value_to_string(expected);

    let verdict = match operator {
        Operator::Equals => {
            let passed = actual_text == expected_text;
            let message = if passed {
                "values are equal".to_string()
            } else {
                format!("expected {}, got {}", expected_text, actual_text)
            };
            (passed, message)
        }
        Operator::NotEquals => {
            let passed = actual_text != expected_text;
            let message = if passed {
                "values differ".to_string()
            } else {
                format!(
                    "expected a value other than {}, but the values are equal",
                    expected_text
                )
            };
            (passed, message)
        }
        Operator::Contains => {
            let passed = actual_text.contains(&expected_text);
            let message = if passed {
                "value contains the expected text".to_string()
            } else {
                format!("{} does not contain {}", actual_text, expected_text)
            };
            (passed, message)
        }
        Operator::NotContains => {
            let passed = !actual_text.contains(&expected_text);
            let message = if passed {
                "value does not contain the expected text".to_string()
            } else {
                format!("{} contains unexpected {}", actual_text, expected_text)
            };
            (passed, message)
        }
        Operator::GreaterThan => {
            let (lhs, rhs) = (to_number(actual), to_number(Some(expected)));
            let passed = !lhs.is_nan() && !rhs.is_nan() && lhs > rhs;
            let message = if passed {
                "value is greater than expected".to_string()
            } else {
                format!("{} is not greater than {}", actual_text, expected_text)
            };
            (passed, message)
        }
        Operator::LessThan => {
            let (lhs, rhs) = (to_number(actual), to_number(Some(expected)));
            let passed = !lhs.is_nan() && !rhs.is_nan() && lhs < rhs;
            let message = if passed {
                "value is less than expected".to_string()
            } else {
                format!("{} is not less than {}", actual_text, expected_text)
            };
            (passed, message)
        }
        Operator::Regex => {
            let regex =
                Regex::new(&expected_text).map_err(|source| AssertionError::InvalidPattern {
                    pattern: expected_text.clone(),
                    source,
                })?;
            let passed = regex.is_match(&actual_text);
            let message = if passed {
                "value matches the pattern".to_string()
            } else {
                format!("{} does not match pattern {}", actual_text, expected_text)
            };
            (passed, message)
        }
        Operator::Exists => {
            let passed = is_present(actual);
            let message = if passed {
                "value exists"
            } else {
                "value does not exist"
            };
            (passed, message.to_string())
        }
        Operator::NotExists => {
            let passed = !is_present(actual);
            let message = if passed {
                "value does not exist"
            } else {
                "value exists but was expected to be absent"
            };
            (passed, message.to_string())
        }
        Operator::Unsupported(tag) => (false, format!("unsupported operator: {}", tag)),
    };

    Ok(verdict)
}

fn is_present(value: Option<&Value>) -> bool {
    matches!(value, Some(v) if !v.is_null())
}
