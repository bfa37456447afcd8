//! Probe task definitions.
//!
//! A task arrives as JSON from the dashboard:
//!
//! ```json
//! {
//!   "task_id": 17,
//!   "target": "https://api.example.com",
//!   "config": {
//!     "initialVariables": [{"name": "$user", "value": "alice"}],
//!     "steps": [ ... ]
//!   }
//! }
//! ```
//!
//! `config` may also be delivered as a JSON-encoded string, in which case it
//! is decoded before the steps are read.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::auth::AuthConfig;
use crate::error::{ProbeError, Result};
use crate::models::step::StepDefinition;

/// A `{name, value}` pair seeding the variable scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialVariable {
    #[serde(default)]
    pub name: String,

    /// Declarations without a value are ignored.
    #[serde(default)]
    pub value: Option<Value>,
}

impl InitialVariable {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
        }
    }

    /// The declaration as a `(name, value)` pair, if it carries a value.
    pub fn as_pair(&self) -> Option<(&str, Value)> {
        self.value.clone().map(|value| (self.name.as_str(), value))
    }
}

/// Steps and variables of a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfig {
    #[serde(default)]
    pub initial_variables: Vec<InitialVariable>,

    /// Older task format; loaded after `initialVariables`.
    #[serde(default)]
    pub variables: Vec<InitialVariable>,

    /// Only the first entry is applied, to every step.
    #[serde(default)]
    pub authentications: Vec<AuthConfig>,

    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

/// A probe task: an ordered list of steps run against one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeTask {
    #[serde(default = "default_task_id", deserialize_with = "deserialize_task_id")]
    pub task_id: String,

    #[serde(default)]
    pub target: String,

    #[serde(default, deserialize_with = "deserialize_task_config")]
    pub config: TaskConfig,
}

impl ProbeTask {
    /// Creates a task with the given id and steps.
    pub fn new(task_id: impl Into<String>, steps: Vec<StepDefinition>) -> Self {
        Self {
            task_id: task_id.into(),
            target: String::new(),
            config: TaskConfig {
                steps,
                ..Default::default()
            },
        }
    }

    /// Parses a task from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Converts an already parsed JSON document into a task.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Reads and parses a task file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ProbeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.config.steps
    }
}

fn default_task_id() -> String {
    "unknown".to_string()
}

/// Accepts numeric task ids as well as strings.
fn deserialize_task_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        Value::Null => Ok(default_task_id()),
        other => Err(de::Error::custom(format!(
            "task_id must be a string or a number, got {}",
            other
        ))),
    }
}

/// Accepts the task config as an object or as a JSON-encoded string.
fn deserialize_task_config<'de, D>(deserializer: D) -> std::result::Result<TaskConfig, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => serde_json::from_str(&text)
            .map_err(|e| de::Error::custom(format!("config is not valid JSON: {}", e))),
        Value::Null => Ok(TaskConfig::default()),
        other => serde_json::from_value(other).map_err(de::Error::custom),
    }
}
