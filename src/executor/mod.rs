//! Step execution.
//!
//! [`ApiStepExecutor`] runs one [`StepDefinition`] at a time against an
//! injected [`HttpExecutor`]:
//!
//! 1. substitute variables into the request template,
//! 2. send the request and time it,
//! 3. extract variables from the response into the shared scope,
//! 4. evaluate the step's assertions.
//!
//! The executor borrows the [`VariableManager`] mutably for its whole
//! lifetime, so steps that share a scope necessarily run one after another.
//!
//! # Examples
//!
//! ```
//! use api_probe::executor::{ApiStepExecutor, RequestError};
//! use api_probe::models::{
//!     AssertionDescriptor, HttpMethod, Operator, ProbeResponse, RequestConfig, Source,
//!     StepDefinition, StepRequest,
//! };
//! use api_probe::variables::VariableManager;
//! use serde_json::json;
//!
//! # tokio_test_block(async {
//! let client = |config: RequestConfig| async move {
//!     Ok::<_, RequestError>(ProbeResponse::new(200).with_data(json!({"echo": config.url})))
//! };
//!
//! let mut scope = VariableManager::new();
//! scope.set_variable("id", json!(42));
//!
//! let mut step = StepDefinition::new("s1", "Fetch", StepRequest::new(HttpMethod::GET, "https://x/$id"));
//! step.assertions.push(AssertionDescriptor::new(Source::Status, "", Operator::Equals, 200));
//!
//! let result = ApiStepExecutor::new(&mut scope).execute_step(&step, &client).await;
//! assert!(result.success);
//! assert_eq!(result.request.unwrap().url, "https://x/42");
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod error;

// Native HTTP executor backed by reqwest
#[cfg(feature = "native")]
pub mod native;

pub use error::RequestError;

#[cfg(feature = "native")]
pub use native::ReqwestExecutor;

use async_trait::async_trait;
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::time::Instant;

use crate::assertion::validate;
use crate::auth::AuthConfig;
use crate::extract::extract_data;
use crate::models::request::RequestConfig;
use crate::models::response::ProbeResponse;
use crate::models::result::{AssertionOutcome, ResponseSummary, StepPhase, StepResult};
use crate::models::step::StepDefinition;
use crate::variables::VariableManager;
use serde_json::Value;

/// Capability to send one prepared request.
///
/// Timeouts and cancellation belong to the implementation; a timed-out
/// request is reported as an ordinary [`RequestError`].
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, config: &RequestConfig) -> Result<ProbeResponse, RequestError>;
}

/// Any async closure taking a [`RequestConfig`] is an executor.
#[async_trait]
impl<F, Fut> HttpExecutor for F
where
    F: Fn(RequestConfig) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ProbeResponse, RequestError>> + Send + 'static,
{
    async fn execute(&self, config: &RequestConfig) -> Result<ProbeResponse, RequestError> {
        (self)(config.clone()).await
    }
}

/// Runs probe steps against a shared variable scope.
#[derive(Debug)]
pub struct ApiStepExecutor<'a> {
    variables: &'a mut VariableManager,
    auth: Option<&'a AuthConfig>,
}

impl<'a> ApiStepExecutor<'a> {
    /// Creates an executor over the given scope.
    pub fn new(variables: &'a mut VariableManager) -> Self {
        Self {
            variables,
            auth: None,
        }
    }

    /// Applies `auth` to every request that does not set `Authorization`.
    pub fn with_auth(mut self, auth: Option<&'a AuthConfig>) -> Self {
        self.auth = auth;
        self
    }

    /// The scope this executor reads from and writes to.
    pub fn variables(&self) -> &VariableManager {
        self.variables
    }

    /// Executes one step and returns its result.
    ///
    /// Never fails: transport errors are recorded in the result's `error`
    /// field and mark the step failed.
    pub async fn execute_step<C>(&mut self, step: &StepDefinition, client: &C) -> StepResult
    where
        C: HttpExecutor + ?Sized,
    {
        let start_time = Instant::now();
        let mut result = StepResult::new(step.step_id.clone(), step.name.clone());
        let mut phase = StepPhase::Pending;

        if let Some(reason) = unusable_request(step) {
            warn!("step '{}' cannot run: {}", step.name, reason);
            self.fail(step, &mut result, &mut phase, reason, start_time);
            return result;
        }

        let request = self.prepare_request(step);
        result.request = Some(request.sanitized());

        self.transition(step, &mut phase, StepPhase::Requesting);
        let mut response = match client.execute(&request).await {
            Ok(response) => response,
            Err(err) => {
                warn!("step '{}' request failed: {}", step.name, err);
                self.fail(step, &mut result, &mut phase, err.to_string(), start_time);
                return result;
            }
        };

        let response_time = elapsed_ms(start_time);
        if response.duration.is_none() {
            response.duration = Some(response_time);
        }
        if response.url.is_none() {
            response.url = Some(request.url.clone());
        }
        result.response = Some(ResponseSummary {
            status: response.status,
            headers: response.headers_json(),
            data: response.data.clone(),
            duration: response_time,
        });

        self.transition(step, &mut phase, StepPhase::Extracting);
        result.variables = self.extract_variables(step, &response);

        self.transition(step, &mut phase, StepPhase::Asserting);
        result.assertions = self.execute_assertions(step, &response);

        result.success = result.assertions.iter().all(AssertionOutcome::success);
        result.duration = elapsed_ms(start_time);

        let outcome = if result.success {
            StepPhase::Succeeded
        } else {
            StepPhase::Failed
        };
        self.transition(step, &mut phase, outcome);

        result
    }

    /// Builds the request for a step with all known variables substituted.
    ///
    /// URL parameters with an empty key or value are dropped; `params` is
    /// only set when at least one parameter remains. The executor's
    /// authentication, if any, fills in a missing `Authorization` header.
    pub fn prepare_request(&self, step: &StepDefinition) -> RequestConfig {
        let scope = &*self.variables;
        let template = &step.request;

        let params: BTreeMap<String, String> = step
            .url_parameters
            .iter()
            .filter(|param| !param.key.is_empty() && !param.value.is_empty())
            .map(|param| (param.key.clone(), scope.replace_variables(&param.value)))
            .collect();

        let mut config = RequestConfig {
            method: template.method.clone(),
            url: scope.replace_variables(&template.url),
            headers: scope.replace_variables_in_map(&template.headers),
            data: template
                .body
                .as_ref()
                .map(|body| scope.replace_variables_in_object(body)),
            params: if params.is_empty() { None } else { Some(params) },
        };

        if config.header("authorization").is_none() {
            if let Some(value) = self.auth.and_then(|auth| auth.authorization(scope)) {
                config.headers.insert("Authorization".to_string(), value);
            }
        }

        debug!("prepared {} {} for step '{}'", config.method, config.url, step.name);
        config
    }

    /// Runs the step's extraction descriptors, storing every non-null value
    /// in the scope.
    ///
    /// Returns the extracted values keyed by descriptor name.
    pub fn extract_variables(
        &mut self,
        step: &StepDefinition,
        response: &ProbeResponse,
    ) -> HashMap<String, Value> {
        let mut extracted = HashMap::new();

        for descriptor in &step.variables {
            if descriptor.name.is_empty() {
                continue;
            }

            match extract_data(response, &descriptor.source, &descriptor.expression) {
                Some(value) if !value.is_null() => {
                    self.variables.set_variable(&descriptor.name, value.clone());
                    extracted.insert(descriptor.name.clone(), value);
                }
                _ => debug!(
                    "no value for variable '{}' ({} {:?})",
                    descriptor.name, descriptor.source, descriptor.expression
                ),
            }
        }

        extracted
    }

    /// Evaluates the step's assertions in declaration order.
    pub fn execute_assertions(
        &self,
        step: &StepDefinition,
        response: &ProbeResponse,
    ) -> Vec<AssertionOutcome> {
        step.assertions
            .iter()
            .map(|assertion| {
                let actual = extract_data(response, &assertion.source, &assertion.expression);
                let expected = self.variables.replace_variables_in_value(&assertion.expected);
                AssertionOutcome {
                    outcome: validate(actual.as_ref(), &assertion.operator, &expected),
                    assertion: assertion.clone(),
                }
            })
            .collect()
    }

    fn transition(&self, step: &StepDefinition, phase: &mut StepPhase, next: StepPhase) {
        debug!("step '{}': {:?} -> {:?}", step.step_id, phase, next);
        *phase = next;
    }

    fn fail(
        &self,
        step: &StepDefinition,
        result: &mut StepResult,
        phase: &mut StepPhase,
        reason: String,
        start_time: Instant,
    ) {
        result.error = Some(reason);
        result.failed_phase = Some(*phase);
        result.duration = elapsed_ms(start_time);
        self.transition(step, phase, StepPhase::Failed);
    }
}

/// Why a step's request template cannot be sent, if it cannot.
fn unusable_request(step: &StepDefinition) -> Option<String> {
    let request = &step.request;
    if !request.method.is_supported() {
        Some(format!("unsupported HTTP method: {}", request.method))
    } else if request.url.trim().is_empty() {
        Some("request has no URL".to_string())
    } else {
        None
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
