//! Multi-step API probing engine
//!
//! This crate runs API probes: ordered HTTP steps that share a variable
//! scope, pull values out of each response, and check the response against
//! assertions.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - **variables**: The shared variable scope and `$name` substitution
//! - **extract**: Reads values out of responses (status, body paths, regex, headers, cookies, ...)
//! - **assertion**: Compares extracted values against expectations
//! - **executor**: Runs one step against an injected HTTP executor
//! - **sequence**: Runs whole probe tasks and aggregates the step results
//! - **models**: Step definitions, requests, responses and results
//! - **config**: Global settings for the HTTP client and the runner
//! - **auth**: Basic and bearer credentials applied to every step of a task
//!
//! # Step Pipeline
//!
//! For every step, [`executor::ApiStepExecutor::execute_step`]:
//! 1. Substitutes known variables into the URL, headers, body and URL parameters
//! 2. Sends the request through an [`executor::HttpExecutor`]
//! 3. Stores the values named by the step's extraction rules in the scope
//! 4. Evaluates the step's assertions
//! 5. Returns a [`models::StepResult`]
//!
//! Because the scope outlives the step, a value extracted by one step can be
//! referenced as `$name` by every later step of the same sequence.
//!
//! # HTTP Execution
//!
//! The engine never performs I/O itself. With the default `native` feature
//! [`executor::ReqwestExecutor`] provides a reqwest-based client; any async
//! closure `Fn(RequestConfig) -> Future<Output = Result<ProbeResponse, RequestError>>`
//! works as well, which is how the tests drive the engine.

pub mod assertion;
pub mod auth;
pub mod config;
pub mod error;
pub mod executor;
pub mod extract;
pub mod models;
pub mod sequence;
pub mod variables;

pub use error::ProbeError;
pub use executor::{ApiStepExecutor, HttpExecutor, RequestError};
pub use sequence::{ProbeTask, SequenceRunner, TaskReport, TaskStatus};
pub use variables::VariableManager;
