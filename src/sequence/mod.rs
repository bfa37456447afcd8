//! Multi-step task execution.
//!
//! [`SequenceRunner`] runs the steps of a [`ProbeTask`] in order through one
//! [`ApiStepExecutor`], so that variables extracted by a step are visible to
//! every later step, and folds the step results into a [`TaskReport`].
//!
//! The scope is seeded in this order, later entries overwriting earlier ones:
//!
//! 1. the task's `initialVariables`,
//! 2. the task's legacy `variables`,
//! 3. system variables given to [`SequenceRunner::with_system_variables`].
//!
//! The first entry of the task's `authentications` is applied to every step.

pub mod report;
pub mod task;

pub use report::{TaskReport, TaskStatus};
pub use task::{InitialVariable, ProbeTask, TaskConfig};

use chrono::Utc;
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

use crate::auth::AuthConfig;
use crate::config::{get_config, ProbeConfig};
use crate::error::{ProbeError, Result};
use crate::executor::{ApiStepExecutor, HttpExecutor};
use crate::variables::{canonical_name, VariableManager};

/// Runs probe tasks.
#[derive(Debug, Clone, Default)]
pub struct SequenceRunner {
    config: ProbeConfig,
    system_variables: HashMap<String, Value>,
}

impl SequenceRunner {
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            config,
            system_variables: HashMap::new(),
        }
    }

    /// Creates a runner using the global configuration.
    pub fn from_global_config() -> Self {
        Self::new(get_config())
    }

    /// Adds variables that are merged into every task's scope after the
    /// task's own variables.
    pub fn with_system_variables<I, K>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        for (name, value) in variables {
            let name = name.as_ref();
            if !name.is_empty() {
                self.system_variables
                    .insert(canonical_name(name).into_owned(), value);
            }
        }
        self
    }

    /// Runs a task in a fresh scope.
    ///
    /// Fails only when the task exceeds the configured step limit; step
    /// failures are reported in the returned [`TaskReport`].
    pub async fn run<C>(&self, task: &ProbeTask, client: &C) -> Result<TaskReport>
    where
        C: HttpExecutor + ?Sized,
    {
        let mut scope = VariableManager::new();
        self.run_with_scope(task, &mut scope, client).await
    }

    /// Runs a task, seeding and then mutating the given scope.
    pub async fn run_with_scope<C>(
        &self,
        task: &ProbeTask,
        scope: &mut VariableManager,
        client: &C,
    ) -> Result<TaskReport>
    where
        C: HttpExecutor + ?Sized,
    {
        let steps = task.steps();
        if steps.len() > self.config.max_steps {
            return Err(ProbeError::TooManySteps {
                count: steps.len(),
                max: self.config.max_steps,
            });
        }

        let config = &task.config;
        scope.extend(config.initial_variables.iter().filter_map(InitialVariable::as_pair));
        scope.extend(config.variables.iter().filter_map(InitialVariable::as_pair));
        scope.extend(self.system_variables.iter().map(|(k, v)| (k, v.clone())));

        info!(
            "starting task {} ({} steps, target {:?})",
            task.task_id,
            steps.len(),
            task.target
        );

        let start_time = Utc::now();
        let started = Instant::now();
        let auth = config.authentications.first();
        match auth {
            Some(AuthConfig::Unsupported) => warn!(
                "task {}: unsupported authentication type, sending requests without it",
                task.task_id
            ),
            Some(auth) => debug!("task {}: applying {} authentication", task.task_id, auth.scheme()),
            None => {}
        }
        let mut executor = ApiStepExecutor::new(scope).with_auth(auth);

        let mut results = Vec::with_capacity(steps.len());
        let mut status = TaskStatus::Success;
        let mut message = String::new();

        for step in steps {
            let result = executor.execute_step(step, client).await;

            if !result.success {
                let reason = result
                    .failure_reason()
                    .unwrap_or_else(|| "unknown error".to_string());
                warn!("task {}: step '{}' failed: {}", task.task_id, step.name, reason);
                status = TaskStatus::Failed;
                message = format!("step '{}' failed: {}", step.name, reason);
            }

            let stop = !result.success && step.fail_fast;
            results.push(result);

            if stop {
                warn!(
                    "task {}: stopping after step '{}' (fail_fast)",
                    task.task_id, step.step_id
                );
                break;
            }
        }

        let total_assertions: usize = results.iter().map(|r| r.assertions.len()).sum();
        let passed_assertions: usize = results.iter().map(|r| r.passed_assertions()).sum();

        if status == TaskStatus::Success && passed_assertions < total_assertions {
            status = TaskStatus::Failed;
            message = format!(
                "assertions failed: {}/{} passed",
                passed_assertions, total_assertions
            );
        }
        if status == TaskStatus::Success {
            message = format!("completed all {} steps", results.len());
        }

        let report = TaskReport {
            task_id: task.task_id.clone(),
            run_id: Uuid::new_v4(),
            status,
            response_time: started.elapsed().as_millis() as u64,
            message,
            steps: results,
            variables: executor.variables().get_all_variables(),
            total_assertions,
            passed_assertions,
            start_time,
            end_time: Utc::now(),
        };

        info!(
            "task {} finished: {:?} in {}ms ({} steps, {} failed)",
            report.task_id,
            report.status,
            report.response_time,
            report.steps.len(),
            report.failed_steps()
        );

        Ok(report)
    }
}
