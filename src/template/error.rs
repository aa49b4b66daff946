//! Template evaluation error types.

use crate::environment::ProviderError;
use thiserror::Error;

/// Errors raised while evaluating a template value.
///
/// Malformed placeholders and expression-engine failures are not errors: the
/// value is returned unchanged instead.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A function call names something outside the built-in library.
    #[error("Unsupported function {0}")]
    UnsupportedFunction(String),

    /// A built-in function received an argument it cannot work with.
    #[error("Invalid argument for {function}: {message}")]
    InvalidArgument { function: String, message: String },

    /// The environment snapshot could not be read while building a context.
    #[error("Unable to read the environment: {0}")]
    Environment(#[from] ProviderError),
}

impl EvalError {
    pub(crate) fn invalid_argument(function: &str, message: impl Into<String>) -> Self {
        EvalError::InvalidArgument {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

/// Errors reported by an [`ExpressionEngine`](super::ExpressionEngine).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The expression could not be parsed.
    #[error("Syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    /// An identifier has no value in the context.
    #[error("{0} is not defined")]
    UndefinedReference(String),

    /// Engine-specific failure.
    #[error("{0}")]
    Other(String),
}
