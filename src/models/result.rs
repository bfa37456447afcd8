//! Step execution results.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::request::RequestConfig;
use super::step::AssertionDescriptor;
use crate::assertion::ValidationOutcome;

/// Phases a step moves through while it executes.
///
/// `Failed` is reachable from every non-terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPhase {
    Pending,
    Requesting,
    Extracting,
    Asserting,
    Succeeded,
    Failed,
}

/// The part of a response kept in a step result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSummary {
    pub status: u16,
    pub headers: Value,
    pub data: Value,
    /// Milliseconds from the start of the step until the response arrived.
    pub duration: u64,
}

/// A validation outcome annotated with the assertion that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionOutcome {
    #[serde(flatten)]
    pub outcome: ValidationOutcome,
    pub assertion: AssertionDescriptor,
}

impl AssertionOutcome {
    pub fn success(&self) -> bool {
        self.outcome.success
    }
}

/// Structured record of one step execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub step_id: String,
    pub step_name: String,
    pub success: bool,

    /// The request after variable substitution.
    pub request: Option<RequestConfig>,

    pub response: Option<ResponseSummary>,

    /// Variables extracted by this step, keyed by descriptor name.
    pub variables: HashMap<String, Value>,

    pub assertions: Vec<AssertionOutcome>,

    /// Total step time in milliseconds.
    pub duration: u64,

    pub error: Option<String>,

    /// Phase that was active when the step failed with an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_phase: Option<StepPhase>,
}

impl StepResult {
    /// Creates an empty, not yet successful result for a step.
    pub fn new(step_id: impl Into<String>, step_name: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            step_name: step_name.into(),
            success: false,
            request: None,
            response: None,
            variables: HashMap::new(),
            assertions: Vec::new(),
            duration: 0,
            error: None,
            failed_phase: None,
        }
    }

    /// Number of assertions that passed.
    pub fn passed_assertions(&self) -> usize {
        self.assertions.iter().filter(|a| a.success()).count()
    }

    /// Short reason for a failed step: the error, or the first failed
    /// assertion's message.
    pub fn failure_reason(&self) -> Option<String> {
        if self.success {
            return None;
        }
        if let Some(error) = &self.error {
            return Some(error.clone());
        }
        self.assertions
            .iter()
            .find(|a| !a.success())
            .map(|a| a.outcome.message.clone())
    }
}
