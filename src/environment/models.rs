//! Environment data models.
//!
//! A host application keeps variables grouped by environment ("dev",
//! "staging", ...). The evaluator only ever sees a point-in-time
//! [`EnvironmentSnapshot`] of the active environment.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single user-defined variable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variable {
    /// Variable name as referenced by `${name}` / `{name}`
    pub name: String,

    /// Raw value, may itself reference other variables
    #[serde(default)]
    pub value: String,

    /// Disabled variables are ignored when building a context
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Environment the variable belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl Variable {
    /// Creates an enabled variable without an environment.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            enabled: true,
            environment: None,
        }
    }

    /// Returns the variable with its `enabled` flag changed.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns the variable assigned to an environment.
    pub fn in_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }
}

/// Variables of the active environment plus system-level values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSnapshot {
    /// User-defined variables
    #[serde(default)]
    pub variables: Vec<Variable>,

    /// System variables (usually the process environment)
    #[serde(default)]
    pub system_variables: HashMap<String, String>,
}

impl EnvironmentSnapshot {
    /// Creates a snapshot from a list of variables.
    pub fn new(variables: Vec<Variable>) -> Self {
        Self {
            variables,
            system_variables: HashMap::new(),
        }
    }

    /// Adds the current process environment as system variables.
    pub fn with_process_env(mut self) -> Self {
        self.system_variables.extend(std::env::vars());
        self
    }

    /// Enabled variables in declaration order.
    pub fn enabled_variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter().filter(|v| v.enabled)
    }

    /// Returns the value of the last enabled variable named `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.enabled_variables()
            .filter(|v| v.name == name)
            .last()
            .map(|v| v.value.as_str())
    }
}
