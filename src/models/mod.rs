//! Core data models for probe steps, requests, responses and results.

pub mod request;
pub mod response;
pub mod result;
pub mod step;

pub use request::{HttpMethod, RequestConfig};
pub use response::{HeaderValue, ProbeResponse};
pub use result::{AssertionOutcome, ResponseSummary, StepPhase, StepResult};
pub use step::{
    AssertionDescriptor, ExtractionDescriptor, Operator, Source, StepDefinition, StepRequest,
    UrlParameter,
};
