//! Native HTTP executor using reqwest.
//!
//! [`ReqwestExecutor`] is the [`HttpExecutor`] used by the `api-probe`
//! binary. Client-level settings (timeout, redirects, TLS validation) come
//! from a [`ProbeConfig`] fixed at construction time.

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use std::time::Instant;

use super::{HttpExecutor, RequestError};
use crate::config::{get_config, ProbeConfig};
use crate::models::request::{HttpMethod, RequestConfig};
use crate::models::response::ProbeResponse;

/// HTTP executor backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: reqwest::Client,
    config: ProbeConfig,
}

impl ReqwestExecutor {
    /// Builds an executor for the given configuration.
    pub fn new(config: ProbeConfig) -> Result<Self, RequestError> {
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects as usize)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = reqwest::Client::builder()
            .timeout(config.timeout_duration())
            .redirect(redirect)
            .danger_accept_invalid_certs(!config.validate_ssl)
            .build()
            .map_err(|e| RequestError::BuildError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Builds an executor from the global configuration.
    pub fn from_global_config() -> Result<Self, RequestError> {
        Self::new(get_config())
    }

    /// The configuration this executor was built with.
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(&self, config: &RequestConfig) -> Result<ProbeResponse, RequestError> {
        validate_url(&config.url)?;

        let start_time = Instant::now();
        let method = to_reqwest_method(&config.method)?;
        let mut builder = self.client.request(method, &config.url);

        for (name, value) in self.config.merged_headers(&config.headers) {
            builder = builder.header(name, value);
        }

        if let Some(params) = &config.params {
            builder = builder.query(params);
        }

        match &config.data {
            None | Some(Value::Null) => {}
            Some(Value::String(body)) => builder = builder.body(body.clone()),
            Some(body) => builder = builder.json(body),
        }

        debug!("sending {} {}", config.method, config.url);
        let response = builder.send().await?;

        let mut probe = ProbeResponse::new(response.status().as_u16());
        probe.url = Some(response.url().to_string());

        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                probe.add_header(name.as_str().to_string(), value.to_string());
            }
        }

        let text = response.text().await?;
        probe.data = serde_json::from_str(&text).unwrap_or(Value::String(text));
        probe.duration = Some(start_time.elapsed().as_millis() as u64);

        debug!(
            "{} {} -> {} in {}ms",
            config.method,
            config.url,
            probe.status,
            probe.duration.unwrap_or_default()
        );

        Ok(probe)
    }
}

fn to_reqwest_method(method: &HttpMethod) -> Result<reqwest::Method, RequestError> {
    Ok(match method {
        HttpMethod::GET => reqwest::Method::GET,
        HttpMethod::POST => reqwest::Method::POST,
        HttpMethod::PUT => reqwest::Method::PUT,
        HttpMethod::DELETE => reqwest::Method::DELETE,
        HttpMethod::PATCH => reqwest::Method::PATCH,
        HttpMethod::HEAD => reqwest::Method::HEAD,
        HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
        HttpMethod::Other(other) => {
            return Err(RequestError::BuildError(format!(
                "unsupported HTTP method: {}",
                other
            )))
        }
    })
}

/// Validates that a URL is well-formed and uses HTTP or HTTPS.
///
/// # Arguments
///
/// * `url` - The URL to validate
///
/// # Returns
///
/// `Ok(())` if valid, or `Err(RequestError)` describing the problem.
fn validate_url(url: &str) -> Result<(), RequestError> {
    let parsed = url::Url::parse(url)?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(RequestError::UnsupportedProtocol(format!(
            "Only HTTP and HTTPS are supported, got: {}",
            scheme
        )));
    }

    Ok(())
}
