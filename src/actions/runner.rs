//! Runs the actions configured on a request.
//!
//! For each phase the runner:
//!
//! 1. builds an evaluation context from the environment (unless disabled),
//! 2. skips disabled runnables and runnables whose condition fails,
//! 3. clones the enabled actions and evaluates placeholders in their
//!    configuration,
//! 4. sorts them by priority and executes them.
//!
//! Synchronous actions run one after another, so a cookie written by one
//! action is visible to the next. Asynchronous actions are spawned on the
//! tokio runtime and their failures are only logged.

use super::condition::ActionCondition;
use super::events::EventSink;
use super::executors::ExecutorRegistry;
use super::model::Action;
use super::ActionError;
use crate::config::{ProcessOptions, RunnerConfig};
use crate::extractor::{RequestData, RequestDataExtractor};
use crate::models::{EditorRequest, Response, TransportRequest};
use crate::template::{EvalError, EvaluateOptions, TemplateEvaluator};
use serde_json::Value;
use std::sync::Arc;

/// Executes request and response actions.
///
/// # Examples
///
/// ```
/// use request_actions::actions::{ActionsRunner, RecordingSink};
/// use request_actions::config::RunnerConfig;
/// use request_actions::models::EditorRequest;
/// use request_actions::template::{ConcatEngine, TemplateEvaluator};
/// use std::sync::Arc;
///
/// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// let evaluator = TemplateEvaluator::new(Arc::new(ConcatEngine));
/// let sink = Arc::new(RecordingSink::new());
/// let runner = ActionsRunner::new(evaluator, sink, RunnerConfig::default());
///
/// let request = EditorRequest::new("GET", "https://api.com");
/// rt.block_on(runner.process_request_actions(Some(&request), None)).unwrap();
/// ```
pub struct ActionsRunner {
    evaluator: Arc<TemplateEvaluator>,
    registry: ExecutorRegistry,
    sink: Arc<dyn EventSink>,
    config: RunnerConfig,
}

impl std::fmt::Debug for ActionsRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionsRunner")
            .field("evaluator", &self.evaluator)
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}

impl ActionsRunner {
    /// Creates a runner with the built-in executors.
    pub fn new(
        evaluator: TemplateEvaluator,
        sink: Arc<dyn EventSink>,
        config: RunnerConfig,
    ) -> Self {
        let evaluator = evaluator.with_system_variables(config.evaluate_system_variables);
        Self {
            evaluator: Arc::new(evaluator),
            registry: ExecutorRegistry::with_defaults(),
            sink,
            config,
        }
    }

    /// Replaces the executor registry.
    pub fn with_registry(mut self, registry: ExecutorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn evaluator(&self) -> &Arc<TemplateEvaluator> {
        &self.evaluator
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs the request-side actions of `request` before it is sent.
    ///
    /// Fails when `request` is missing, when a synchronous action with
    /// `failOnError` fails, or when a condition reads an unknown URL part.
    pub async fn process_request_actions(
        &self,
        request: Option<&EditorRequest>,
        options: Option<&ProcessOptions>,
    ) -> Result<(), ActionError> {
        let request = request.ok_or(ActionError::MissingArgument("request"))?;
        let runnables = request.request_actions();
        if !runnables.iter().any(|runnable| runnable.enabled) {
            log::trace!("No request actions to run");
            return Ok(());
        }
        let data = Arc::new(RequestData::for_request(request.clone()));
        self.run(runnables, data, options).await
    }

    /// Runs the response-side actions of `request` after `response` was
    /// received for the `executed` transport request.
    pub async fn process_response_actions(
        &self,
        request: Option<&EditorRequest>,
        executed: Option<&TransportRequest>,
        response: Option<&Response>,
        options: Option<&ProcessOptions>,
    ) -> Result<(), ActionError> {
        let request = request.ok_or(ActionError::MissingArgument("request"))?;
        let executed = executed.ok_or(ActionError::MissingArgument("executed"))?;
        let response = response.ok_or(ActionError::MissingArgument("response"))?;
        let runnables = request.response_actions();
        if !runnables.iter().any(|runnable| runnable.enabled) {
            log::trace!("No response actions to run");
            return Ok(());
        }
        let data = Arc::new(RequestData::for_response(
            request.clone(),
            executed.clone(),
            response.clone(),
        ));
        self.run(runnables, data, options).await
    }

    async fn run(
        &self,
        runnables: &[ActionCondition],
        data: Arc<RequestData>,
        options: Option<&ProcessOptions>,
    ) -> Result<(), ActionError> {
        let config = self.config.merge(options);
        let evaluate_options = if config.evaluate_variables {
            Some(EvaluateOptions::with_context(
                self.evaluator.build_context(None).await?,
            ))
        } else {
            None
        };

        for runnable in runnables.iter().filter(|runnable| runnable.enabled) {
            if !runnable.satisfied(&RequestDataExtractor::new(&data))? {
                log::debug!("Condition not satisfied, skipping {} actions", runnable.actions.len());
                continue;
            }

            let mut actions = Vec::new();
            for action in runnable.enabled_actions() {
                let mut action = action.clone();
                if let Some(evaluate_options) = &evaluate_options {
                    if let Err(e) = self.evaluate_action(&mut action, evaluate_options).await {
                        report_failure(&action, e.into())?;
                        continue;
                    }
                }
                actions.push(action);
            }
            actions.sort_by_key(|action| action.priority);

            for action in actions {
                self.execute(action, &data).await?;
            }
        }
        Ok(())
    }

    /// Evaluates placeholders in `config`, `config.source` and
    /// `config.source.iterator`.
    async fn evaluate_action(
        &self,
        action: &mut Action,
        options: &EvaluateOptions,
    ) -> Result<(), EvalError> {
        let Value::Object(config) = &mut action.config else {
            return Ok(());
        };
        self.evaluator.evaluate_variables(config, options).await?;
        if let Some(Value::Object(source)) = config.get_mut("source") {
            self.evaluator.evaluate_variables(source, options).await?;
            if let Some(Value::Object(iterator)) = source.get_mut("iterator") {
                self.evaluator.evaluate_variables(iterator, options).await?;
            }
        }
        Ok(())
    }

    async fn execute(&self, action: Action, data: &Arc<RequestData>) -> Result<(), ActionError> {
        let Some(executor) = self.registry.get(&action.name) else {
            let error = ActionError::UnknownAction(action.name.clone());
            if !action.sync {
                log::error!("{}", error);
                return Ok(());
            }
            return report_failure(&action, error);
        };

        if action.sync {
            log::debug!("Running action {} (priority {})", action.name, action.priority);
            return match executor.execute(&action, data, self.sink.as_ref()).await {
                Ok(()) => Ok(()),
                Err(e) => report_failure(&action, e),
            };
        }

        log::debug!("Spawning action {} (priority {})", action.name, action.priority);
        let data = Arc::clone(data);
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            if let Err(e) = executor.execute(&action, &data, sink.as_ref()).await {
                log::error!("Action {} failed: {}", action.name, e);
            }
        });
        Ok(())
    }
}

/// Propagates `error` when the action has `failOnError`, logs it otherwise.
fn report_failure(action: &Action, error: ActionError) -> Result<(), ActionError> {
    if action.fail_on_error {
        return Err(error);
    }
    log::warn!("Action {} failed: {}", action.name, error);
    Ok(())
}
