//! Templating for request values.
//!
//! This module resolves `${name}` and `{name}` placeholders and built-in
//! function calls (`now()`, `random()`, `Math.*`, `String.*`,
//! `encodeURIComponent()`, ...) against variables of the active environment.
//!
//! The placeholder expression itself is evaluated by an injected
//! [`ExpressionEngine`]; [`ConcatEngine`] is the engine used by default.

mod builtins;
pub mod cache;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod tokenizer;

pub use cache::FunctionCache;
pub use engine::{ConcatEngine, ExpressionEngine};
pub use error::{EngineError, EvalError};
pub use evaluator::{EvaluateOptions, TemplateEvaluator, MAX_CONTEXT_ROUNDS};
pub use tokenizer::Tokenizer;

use std::collections::HashMap;

/// Variable name to (possibly already resolved) value.
pub type ContextMap = HashMap<String, String>;
