//! Path expressions for reading values out of JSON bodies.
//!
//! Two syntaxes are supported:
//!
//! - path expressions, `$.user.items[0].id`: dot-separated segments, each
//!   optionally followed by one or more `[index]` suffixes;
//! - property paths, `user.items.0.id`: plain dot-separated keys.
//!
//! # Examples
//!
//! ```
//! use api_probe::extract::path::evaluate_path;
//! use serde_json::json;
//!
//! let body = json!({"a": {"b": [{"c": 5}]}});
//! assert_eq!(evaluate_path(&body, "$.a.b[0].c"), Some(json!(5)));
//! assert_eq!(evaluate_path(&body, "$.a.b[5].c"), None);
//! ```

use serde_json::Value;

use crate::variables::value::is_truthy;

/// Represents one dot-separated segment of a path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    /// Property name; empty for a bare index segment such as `[0]`.
    pub field: String,

    /// Indices applied after the field is resolved.
    ///
    /// Indices that are not integers are dropped. Negative indices are kept
    /// and never match an element.
    pub indices: Vec<i64>,
}

/// Parses a path expression into segments.
///
/// A leading `$.` is stripped if present.
///
/// - "user.name" -> [user, name]
/// - "items[0].id" -> [items[0], id]
/// - "matrix[1][2]" -> [matrix[1, 2]]
pub fn parse_path_segments(expression: &str) -> Vec<PathSegment> {
    let path = expression.strip_prefix("$.").unwrap_or(expression);

    path.split('.').map(parse_segment).collect()
}

fn parse_segment(part: &str) -> PathSegment {
    if !(part.contains('[') && part.contains(']')) {
        return PathSegment {
            field: part.to_string(),
            indices: Vec::new(),
        };
    }

    let mut pieces = part.split('[');
    let field = pieces.next().unwrap_or_default().to_string();
    let indices = pieces
        .filter_map(|piece| piece.trim_end_matches(']').trim().parse::<i64>().ok())
        .collect();

    PathSegment { field, indices }
}

/// Looks up one key in an object, or one numeric key in an array.
fn lookup<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Evaluates a `$.`-style path expression against a JSON value.
///
/// Returns `None` as soon as an intermediate value is missing or null, or an
/// index is negative or past the end of an array. An index applied to
/// something that is not an array leaves the current value as it is.
pub fn evaluate_path(root: &Value, expression: &str) -> Option<Value> {
    let mut current = root;

    for segment in parse_path_segments(expression) {
        if current.is_null() {
            return None;
        }

        if !segment.field.is_empty() || segment.indices.is_empty() {
            current = lookup(current, &segment.field)?;
        }

        for index in segment.indices {
            if let Value::Array(items) = current {
                current = usize::try_from(index).ok().and_then(|i| items.get(i))?;
            }
        }
    }

    Some(current.clone())
}

/// Walks a plain dot-separated property path.
///
/// A missing key, or a falsy value (null, `false`, 0, empty string) that
/// still has segments left, ends the walk with `None`.
pub fn get_nested_property(root: &Value, path: &str) -> Option<Value> {
    let mut current = root;

    for key in path.split('.') {
        if !is_truthy(current) {
            return None;
        }
        current = lookup(current, key)?;
    }

    Some(current.clone())
}
