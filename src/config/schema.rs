//! Configuration schema for the actions runner.

use serde::{Deserialize, Serialize};

/// Settings of an [`ActionsRunner`](crate::actions::ActionsRunner).
///
/// Read from the host settings under the "request-actions" key. Missing
/// settings fall back to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerConfig {
    /// Whether variables are evaluated before conditions and actions run.
    ///
    /// When disabled no environment snapshot is taken and action
    /// configurations are used as written. Defaults to true.
    #[serde(default = "default_evaluate_variables")]
    pub evaluate_variables: bool,

    /// Whether system variables are part of the evaluation context.
    ///
    /// Defaults to true.
    #[serde(default = "default_evaluate_system_variables")]
    pub evaluate_system_variables: bool,
}

/// Per-call overrides of a [`RunnerConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluate_variables: Option<bool>,
}

impl ProcessOptions {
    /// Options that skip variable evaluation for one call.
    pub fn without_variables() -> Self {
        Self {
            evaluate_variables: Some(false),
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            evaluate_variables: default_evaluate_variables(),
            evaluate_system_variables: default_evaluate_system_variables(),
        }
    }
}

impl RunnerConfig {
    /// Applies per-call overrides, which take precedence over this config.
    pub fn merge(&self, options: Option<&ProcessOptions>) -> Self {
        let mut merged = *self;
        if let Some(evaluate) = options.and_then(|o| o.evaluate_variables) {
            merged.evaluate_variables = evaluate;
        }
        merged
    }
}

// Default value functions

fn default_evaluate_variables() -> bool {
    true
}

fn default_evaluate_system_variables() -> bool {
    true
}
