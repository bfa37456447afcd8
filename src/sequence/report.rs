//! Aggregated result of a probe task run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::result::StepResult;

/// Overall outcome of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Success,
    Failed,
}

/// Report produced by [`SequenceRunner`](super::SequenceRunner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReport {
    pub task_id: String,

    /// Unique id of this run.
    pub run_id: Uuid,

    pub status: TaskStatus,

    /// Wall-clock time of the whole run in milliseconds.
    pub response_time: u64,

    pub message: String,

    /// Results of the steps that ran, in order.
    pub steps: Vec<StepResult>,

    /// The variable scope after the last step.
    pub variables: HashMap<String, Value>,

    pub total_assertions: usize,
    pub passed_assertions: usize,

    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl TaskReport {
    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }

    /// Number of steps that failed.
    pub fn failed_steps(&self) -> usize {
        self.steps.iter().filter(|step| !step.success).count()
    }
}
