//! Configuration schema for the probe engine.
//!
//! Defines the user-configurable settings for HTTP execution and task runs,
//! together with their defaults and validation rules.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Main configuration structure for probe runs.
///
/// Read from the `"api-probe"` key of a settings document. Missing fields
/// fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeConfig {
    /// Request timeout in milliseconds.
    ///
    /// Covers connection, headers and body download. Defaults to 30000ms.
    ///
    /// Must be greater than 0.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Whether to automatically follow HTTP redirects. Defaults to true.
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,

    /// Maximum number of redirects to follow.
    ///
    /// Only used when `follow_redirects` is true. Defaults to 10; 0 disables
    /// redirects even when following is enabled.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Whether to validate TLS certificates. Defaults to true.
    #[serde(default = "default_validate_ssl")]
    pub validate_ssl: bool,

    /// Headers sent with every request unless the step sets the same header.
    #[serde(default = "default_headers")]
    pub default_headers: HashMap<String, String>,

    /// Largest number of steps a single task may contain.
    ///
    /// Must be greater than 0.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            follow_redirects: default_follow_redirects(),
            max_redirects: default_max_redirects(),
            validate_ssl: default_validate_ssl(),
            default_headers: default_headers(),
            max_steps: default_max_steps(),
        }
    }
}

impl ProbeConfig {
    /// Validates the configuration.
    ///
    /// # Returns
    ///
    /// `Ok(())` if all settings are valid, or `Err` with a descriptive error message.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout == 0 {
            return Err("timeout must be greater than 0".to_string());
        }

        if self.max_steps == 0 {
            return Err("maxSteps must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Returns the timeout as a [`Duration`].
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// Headers for a request: defaults first, then `headers` on top.
    ///
    /// Header names are compared case-insensitively; a request header
    /// replaces a default header of the same name.
    pub fn merged_headers(&self, headers: &HashMap<String, String>) -> HashMap<String, String> {
        let mut merged: HashMap<String, String> = self
            .default_headers
            .iter()
            .filter(|(name, _)| !headers.keys().any(|k| k.eq_ignore_ascii_case(name)))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        merged.extend(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

fn default_timeout() -> u64 {
    30000
}

fn default_follow_redirects() -> bool {
    true
}

fn default_max_redirects() -> u32 {
    10
}

fn default_validate_ssl() -> bool {
    true
}

fn default_headers() -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert(
        "User-Agent".to_string(),
        format!("api-probe/{}", env!("CARGO_PKG_VERSION")),
    );
    headers
}

fn default_max_steps() -> usize {
    100
}
