//! Environment access for the template evaluator.
//!
//! The host owns the variable store; this crate reads it through the
//! [`EnvironmentProvider`] trait once per processing call.

pub mod models;

pub use models::{EnvironmentSnapshot, Variable};

use async_trait::async_trait;
use std::sync::RwLock;
use thiserror::Error;

/// Failure reported by an environment provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("environment provider failed: {0}")]
pub struct ProviderError(pub String);

/// Supplies the current variable set.
#[async_trait]
pub trait EnvironmentProvider: Send + Sync {
    /// Returns a snapshot of the active environment.
    async fn snapshot(&self) -> Result<EnvironmentSnapshot, ProviderError>;
}

/// In-memory provider holding a single snapshot.
#[derive(Debug, Default)]
pub struct StaticEnvironment {
    snapshot: RwLock<EnvironmentSnapshot>,
}

impl StaticEnvironment {
    /// Creates a provider serving `snapshot`.
    pub fn new(snapshot: EnvironmentSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }

    /// Creates a provider serving the given variables.
    pub fn from_variables(variables: Vec<Variable>) -> Self {
        Self::new(EnvironmentSnapshot::new(variables))
    }

    /// Replaces the value of `name`, adding an enabled variable when missing.
    pub fn set_variable(&self, name: &str, value: &str) {
        if let Ok(mut snapshot) = self.snapshot.write() {
            match snapshot.variables.iter_mut().find(|v| v.name == name) {
                Some(variable) => variable.value = value.to_string(),
                None => snapshot.variables.push(Variable::new(name, value)),
            }
        }
    }
}

#[async_trait]
impl EnvironmentProvider for StaticEnvironment {
    async fn snapshot(&self) -> Result<EnvironmentSnapshot, ProviderError> {
        self.snapshot
            .read()
            .map(|snapshot| snapshot.clone())
            .map_err(|e| ProviderError(e.to_string()))
    }
}
