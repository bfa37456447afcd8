//! The variable scope shared by the steps of one probe sequence.
//!
//! Variables are referenced in request templates as `$name`: a dollar sign,
//! one ASCII letter, then any number of ASCII letters or digits. Names are
//! stored in their canonical `$`-prefixed form; every accessor accepts the
//! bare name as well.
//!
//! # Examples
//!
//! ```
//! use api_probe::variables::VariableManager;
//! use serde_json::json;
//!
//! let mut scope = VariableManager::new();
//! scope.set_variable("userId", json!(42));
//!
//! assert_eq!(scope.replace_variables("/users/$userId"), "/users/42");
//! assert_eq!(scope.replace_variables("/users/$other"), "/users/$other");
//! ```

use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;

use super::value::value_to_string;

/// Matches `$name` tokens.
static VARIABLE_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$([a-zA-Z][a-zA-Z0-9]*)").expect("Failed to compile variable token regex")
});

/// Returns the `$`-prefixed form of a variable name.
pub fn canonical_name(name: &str) -> Cow<'_, str> {
    if name.starts_with('$') {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("${}", name))
    }
}

/// Named variables carried from one step to the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableManager {
    variables: HashMap<String, Value>,
}

impl VariableManager {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scope seeded from `(name, value)` pairs.
    ///
    /// Pairs with an empty name are ignored.
    pub fn with_variables<I, K>(variables: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let mut manager = Self::new();
        manager.extend(variables);
        manager
    }

    /// Merges `(name, value)` pairs into the scope, overwriting existing names.
    pub fn extend<I, K>(&mut self, variables: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        for (name, value) in variables {
            if !name.as_ref().is_empty() {
                self.set_variable(name.as_ref(), value);
            }
        }
    }

    /// Stores a variable, replacing any previous value.
    pub fn set_variable(&mut self, name: &str, value: Value) {
        let name = canonical_name(name).into_owned();
        debug!("set variable {} = {}", name, value);
        self.variables.insert(name, value);
    }

    /// Returns the value of a variable, if set.
    pub fn get_variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(canonical_name(name).as_ref())
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(canonical_name(name).as_ref())
    }

    /// Removes a variable, returning its value if it was set.
    pub fn delete_variable(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(canonical_name(name).as_ref())
    }

    pub fn clear(&mut self) {
        self.variables.clear();
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Returns a snapshot of every variable keyed by canonical name.
    pub fn get_all_variables(&self) -> HashMap<String, Value> {
        self.variables.clone()
    }

    /// Replaces every known `$name` token in `text` with the text form of
    /// its value.
    ///
    /// Unknown tokens and tokens whose value is null stay in the output
    /// exactly as written. Replaced text is never scanned again.
    pub fn replace_variables(&self, text: &str) -> String {
        if !text.contains('$') {
            return text.to_string();
        }

        VARIABLE_TOKEN_REGEX
            .replace_all(text, |caps: &Captures| {
                let token = &caps[0];
                match self.variables.get(token) {
                    Some(value) if !value.is_null() => value_to_string(value),
                    _ => token.to_string(),
                }
            })
            .into_owned()
    }

    /// Applies [`replace_variables`](Self::replace_variables) to a JSON value
    /// that is a string; any other value is returned unchanged.
    pub fn replace_variables_in_value(&self, value: &Value) -> Value {
        match value {
            Value::String(text) => Value::String(self.replace_variables(text)),
            other => other.clone(),
        }
    }

    /// Substitutes variables in every string of a JSON tree.
    ///
    /// Arrays are mapped element-wise and objects value-wise; object keys
    /// and non-string leaves are left as they are.
    pub fn replace_variables_in_object(&self, value: &Value) -> Value {
        match value {
            Value::String(text) => Value::String(self.replace_variables(text)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.replace_variables_in_object(item))
                    .collect(),
            ),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, item)| (key.clone(), self.replace_variables_in_object(item)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Substitutes variables in every value of a string map.
    pub fn replace_variables_in_map(
        &self,
        map: &HashMap<String, String>,
    ) -> HashMap<String, String> {
        map.iter()
            .map(|(key, value)| (key.clone(), self.replace_variables(value)))
            .collect()
    }
}
