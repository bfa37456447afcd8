//! Crate-level error type.
//!
//! Step execution never fails outright; these errors cover what happens
//! around it: reading a task, loading configuration, and refusing tasks that
//! exceed configured limits.

use std::path::PathBuf;
use thiserror::Error;

use crate::executor::RequestError;

/// Errors raised while preparing or running a probe task.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The task document is not valid JSON or has the wrong shape.
    #[error("invalid task definition: {0}")]
    InvalidTask(#[from] serde_json::Error),

    /// A file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration failed validation.
    #[error("{0}")]
    Config(String),

    /// The task has more steps than the configuration allows.
    #[error("task has {count} steps, the limit is {max}")]
    TooManySteps { count: usize, max: usize },

    /// The HTTP executor could not be created.
    #[error("failed to create HTTP client: {0}")]
    Client(#[from] RequestError),
}

pub type Result<T> = std::result::Result<T, ProbeError>;
