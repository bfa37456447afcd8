//! Loose conversions of JSON values to text and numbers.
//!
//! Step definitions compare values the way the dashboard always has:
//! equality and containment work on the text form of both sides, ordering
//! works on a numeric coercion of both sides. These helpers define those
//! two forms in one place.

use serde_json::{Number, Value};

/// Returns the text form of a JSON value.
///
/// - strings: as-is, without quotes
/// - integral numbers: without a fractional part (`5.0` becomes `5`)
/// - booleans: `true` / `false`
/// - null: `null`
/// - arrays and objects: compact JSON
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => format_number(n),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Text form of a possibly absent value; an absent value reads `undefined`.
pub fn optional_value_to_string(value: Option<&Value>) -> String {
    value
        .map(value_to_string)
        .unwrap_or_else(|| "undefined".to_string())
}

/// Formats a JSON number, dropping the fraction of integral floats.
pub fn format_number(number: &Number) -> String {
    if let Some(i) = number.as_i64() {
        return i.to_string();
    }
    if let Some(u) = number.as_u64() {
        return u.to_string();
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => number.to_string(),
    }
}

/// Coerces a possibly absent JSON value to a number.
///
/// Absent values, arrays and objects coerce to NaN; null to 0; booleans to
/// 1 or 0; strings through [`parse_number`].
pub fn to_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => parse_number(s),
        Some(Value::Array(_)) | Some(Value::Object(_)) => f64::NAN,
    }
}

/// Parses text as a number.
///
/// Surrounding whitespace is ignored and blank text is 0. Accepts decimal
/// notation with an optional exponent, `0x` hexadecimal and the words
/// `Infinity`/`-Infinity`. Anything else is NaN.
pub fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    // Rust's float parser also accepts "inf" and "nan"; restrict to plain
    // decimal syntax first.
    let is_decimal = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !is_decimal {
        return f64::NAN;
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Whether a value counts as "truthy" when walking property paths.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
