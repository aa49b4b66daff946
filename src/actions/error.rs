//! Error types for actions and the actions runner.

use crate::extractor::ExtractError;
use crate::template::EvalError;
use thiserror::Error;

/// Error from an outbound event sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Event sink error: {0}")]
pub struct SinkError(pub String);

/// Errors raised while running actions.
#[derive(Debug, Error)]
pub enum ActionError {
    /// A required argument of the runner was not provided
    #[error("The {0} argument is required")]
    MissingArgument(&'static str),

    /// The value an action writes could not be read
    #[error("Cannot read value for the action \"{name}\"")]
    MissingValue { name: String },

    /// No executor is registered under the action name
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// The action configuration does not fit the action kind
    #[error("Invalid configuration for the action \"{name}\": {message}")]
    InvalidConfig { name: String, message: String },

    /// A URL required by a cookie action is missing or invalid
    #[error("Invalid cookie url: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Evaluation(#[from] EvalError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl ActionError {
    /// Creates an [`ActionError::InvalidConfig`].
    pub fn invalid_config(name: &str, message: impl std::fmt::Display) -> Self {
        ActionError::InvalidConfig {
            name: name.to_string(),
            message: message.to_string(),
        }
    }
}
