//! Configuration for the actions runner.
//!
//! Configuration is read from host settings under the "request-actions" key
//! and merged with defaults. Per-call [`ProcessOptions`] override it for a
//! single run.

pub mod schema;

pub use schema::{ProcessOptions, RunnerConfig};

use serde_json::Value;

/// Settings key holding the runner configuration.
pub const SETTINGS_KEY: &str = "request-actions";

/// Loads configuration from host settings.
///
/// Settings that cannot be parsed are logged and replaced with defaults.
///
/// # Example
///
/// ```
/// use request_actions::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "request-actions": {
///         "evaluateVariables": false
///     }
/// });
///
/// let config = load_config(Some(&settings));
/// assert!(!config.evaluate_variables);
/// assert!(config.evaluate_system_variables);
/// ```
pub fn load_config(settings_json: Option<&Value>) -> RunnerConfig {
    let Some(section) = settings_json.and_then(|settings| settings.get(SETTINGS_KEY)) else {
        return RunnerConfig::default();
    };

    match serde_json::from_value::<RunnerConfig>(section.clone()) {
        Ok(config) => config,
        Err(e) => {
            log::warn!(
                "Failed to parse {} settings: {}. Using defaults.",
                SETTINGS_KEY,
                e
            );
            RunnerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_config_with_defaults() {
        assert_eq!(load_config(None), RunnerConfig::default());
    }

    #[test]
    fn test_load_config_with_user_settings() {
        let settings = json!({
            "request-actions": {
                "evaluateVariables": false,
                "evaluateSystemVariables": false
            }
        });

        let config = load_config(Some(&settings));
        assert!(!config.evaluate_variables);
        assert!(!config.evaluate_system_variables);
    }

    #[test]
    fn test_load_config_invalid_json() {
        let settings = json!({
            "request-actions": {
                "evaluateVariables": "sometimes"
            }
        });

        assert_eq!(load_config(Some(&settings)), RunnerConfig::default());
    }

    #[test]
    fn test_no_settings_key() {
        let settings = json!({
            "other-extension": {
                "evaluateVariables": false
            }
        });

        assert_eq!(load_config(Some(&settings)), RunnerConfig::default());
    }

    #[test]
    fn test_empty_settings() {
        let settings = json!({"request-actions": {}});
        assert_eq!(load_config(Some(&settings)), RunnerConfig::default());
    }
}
