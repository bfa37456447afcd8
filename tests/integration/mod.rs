//! Integration tests module for the probe engine
//!
//! Shared helpers for driving steps and tasks through scripted HTTP
//! executors.

pub mod sequence_test;

#[cfg(feature = "native")]
pub mod native_executor_test;

use api_probe::executor::RequestError;
use api_probe::models::{ProbeResponse, RequestConfig};
use serde_json::Value;
use std::sync::{Arc, Mutex, Once};

static INIT: Once = Once::new();

/// Initialize test environment (run once)
pub fn init_test_env() {
    INIT.call_once(|| {
        #[cfg(feature = "native")]
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Builds a JSON response the way an HTTP executor would.
pub fn json_response(status: u16, body: Value) -> ProbeResponse {
    ProbeResponse::new(status)
        .with_header("Content-Type", "application/json")
        .with_data(body)
}

/// An executor that replays canned responses in order and records every
/// request it receives.
#[derive(Clone, Default)]
pub struct ScriptedExecutor {
    responses: Arc<Mutex<Vec<Result<ProbeResponse, RequestError>>>>,
    pub requests: Arc<Mutex<Vec<RequestConfig>>>,
}

impl ScriptedExecutor {
    pub fn new(mut responses: Vec<Result<ProbeResponse, RequestError>>) -> Self {
        responses.reverse();
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::default(),
        }
    }

    pub fn recorded(&self) -> Vec<RequestConfig> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl api_probe::HttpExecutor for ScriptedExecutor {
    async fn execute(&self, config: &RequestConfig) -> Result<ProbeResponse, RequestError> {
        self.requests.lock().unwrap().push(config.clone());
        self.responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(RequestError::Other("no scripted response left".to_string())))
    }
}
