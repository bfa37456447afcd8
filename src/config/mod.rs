//! Configuration management for probe runs.
//!
//! Configuration is read from the `"api-probe"` key of a settings document,
//! merged with defaults, validated, and published through a process-wide
//! singleton.

pub mod schema;

pub use schema::ProbeConfig;

use log::warn;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::RwLock;

/// Key under which probe settings live in a settings document.
pub const SETTINGS_KEY: &str = "api-probe";

/// Global configuration instance.
static CONFIG: Lazy<RwLock<ProbeConfig>> = Lazy::new(|| RwLock::new(ProbeConfig::default()));

/// Loads configuration from a settings document.
///
/// Settings that fail to deserialize are ignored with a warning and the
/// defaults are used instead. Settings that deserialize but fail validation
/// are an error and leave the global configuration untouched.
///
/// # Arguments
///
/// * `settings_json` - Optional JSON value holding user settings under `"api-probe"`
///
/// # Returns
///
/// `Ok(ProbeConfig)` with the loaded configuration, or `Err` if validation fails.
///
/// # Example
///
/// ```no_run
/// use api_probe::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "api-probe": {
///         "timeout": 60000,
///         "validateSsl": false
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.timeout, 60000);
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<ProbeConfig, String> {
    let mut config = ProbeConfig::default();

    if let Some(settings) = settings_json.as_ref().and_then(|s| s.get(SETTINGS_KEY)) {
        match serde_json::from_value::<ProbeConfig>(settings.clone()) {
            Ok(user_config) => config = user_config,
            Err(e) => warn!("failed to parse {} settings: {}; using defaults", SETTINGS_KEY, e),
        }
    }

    config
        .validate()
        .map_err(|e| format!("Invalid configuration: {}", e))?;

    if let Ok(mut global_config) = CONFIG.write() {
        *global_config = config.clone();
    }

    Ok(config)
}

/// Gets a copy of the current global configuration.
///
/// Returns the defaults if nothing has been loaded yet.
pub fn get_config() -> ProbeConfig {
    CONFIG
        .read()
        .map(|c| c.clone())
        .unwrap_or_else(|_| ProbeConfig::default())
}

/// Updates the global configuration in place.
///
/// If the result fails validation the configuration reverts to defaults.
///
/// # Example
///
/// ```no_run
/// use api_probe::config::update_config;
///
/// update_config(|config| {
///     config.timeout = 60000;
/// });
/// ```
pub fn update_config<F>(updater: F)
where
    F: FnOnce(&mut ProbeConfig),
{
    if let Ok(mut config) = CONFIG.write() {
        updater(&mut config);

        if let Err(e) = config.validate() {
            warn!("configuration invalid after update: {}; reverting to defaults", e);
            *config = ProbeConfig::default();
        }
    }
}

/// Resets the configuration to defaults.
pub fn reset_config() {
    if let Ok(mut config) = CONFIG.write() {
        *config = ProbeConfig::default();
    }
}
