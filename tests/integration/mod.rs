//! Integration tests module for request actions
//!
//! Shared fixtures for the request/response pipeline tests.

pub mod actions_runner_test;
pub mod extractor_test;
pub mod template_test;

use request_actions::actions::{ActionsRunner, EventSink};
use request_actions::config::RunnerConfig;
use request_actions::environment::{StaticEnvironment, Variable};
use request_actions::template::{ConcatEngine, TemplateEvaluator};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Initialize test environment (run once)
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Environment used by most tests.
pub fn test_environment() -> Arc<StaticEnvironment> {
    Arc::new(StaticEnvironment::from_variables(vec![
        Variable::new("host", "api.example.com"),
        Variable::new("baseUrl", "https://{host}/v1"),
        Variable::new("tokenField", "token"),
        Variable::new("disabled", "nope").with_enabled(false),
    ]))
}

/// Evaluator reading from [`test_environment`].
pub fn test_evaluator() -> TemplateEvaluator {
    TemplateEvaluator::new(Arc::new(ConcatEngine)).with_environment(test_environment())
}

/// Runner with default configuration emitting to `sink`.
pub fn test_runner(sink: Arc<dyn EventSink>) -> ActionsRunner {
    init_test_env();
    ActionsRunner::new(test_evaluator(), sink, RunnerConfig::default())
}
