//! Request Actions for REST clients
//!
//! This crate post-processes HTTP exchanges: before a request is sent or
//! after its response arrives, a user-configured rule set inspects the
//! traffic and updates session state such as variables and cookies.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - **template**: Placeholder and function evaluation (`${token}`, `{host}`, `now()`)
//! - **environment**: Variable snapshots read through an injected provider
//! - **conditions**: Loosely typed comparison operators
//! - **extractor**: Reads URL parts, headers, status, method and JSON/XML bodies
//! - **actions**: Runnables, actions, executors and the actions runner
//! - **models**: Editor request, transport request and response records
//! - **config**: Runner settings loaded from host settings
//! - **coerce**: Value coercions shared by the modules above
//!
//! # Processing a response
//!
//! 1. The runner builds an evaluation context from the environment
//! 2. Each enabled runnable's condition is checked against the exchange
//! 3. Placeholders in the configuration of its enabled actions are evaluated
//! 4. The actions run in priority order and emit events to the host's sink
//!
//! # Usage
//!
//! ```
//! use request_actions::actions::{map_runnables, ActionEvent, ActionsRunner, RecordingSink};
//! use request_actions::config::RunnerConfig;
//! use request_actions::environment::{StaticEnvironment, Variable};
//! use request_actions::models::{EditorRequest, RequestActions, Response, TransportRequest};
//! use request_actions::template::{ConcatEngine, TemplateEvaluator};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//!
//! let environment = StaticEnvironment::from_variables(vec![Variable::new("field", "token")]);
//! let evaluator =
//!     TemplateEvaluator::new(Arc::new(ConcatEngine)).with_environment(Arc::new(environment));
//! let sink = Arc::new(RecordingSink::new());
//! let runner = ActionsRunner::new(evaluator, sink.clone(), RunnerConfig::default());
//!
//! let response_actions = map_runnables(vec![json!({
//!     "type": "response",
//!     "name": "set-variable",
//!     "enabled": true,
//!     "config": {
//!         "name": "authToken",
//!         "source": {"type": "response", "source": "body", "path": "{field}"}
//!     }
//! })]);
//! let request =
//!     EditorRequest::new("POST", "https://api.example.com/login").with_actions(RequestActions {
//!         request: vec![],
//!         response: response_actions,
//!     });
//! let executed = TransportRequest::new("POST", "https://api.example.com/login");
//! let response = Response::new(200, "OK")
//!     .with_headers("Content-Type: application/json")
//!     .with_payload(r#"{"token": "abc123"}"#);
//!
//! rt.block_on(runner.process_response_actions(
//!     Some(&request),
//!     Some(&executed),
//!     Some(&response),
//!     None,
//! ))
//! .unwrap();
//! assert_eq!(
//!     sink.events(),
//!     vec![ActionEvent::VariableSet {
//!         name: "authToken".to_string(),
//!         value: "abc123".to_string()
//!     }]
//! );
//! ```

pub mod actions;
pub mod coerce;
pub mod conditions;
pub mod config;
pub mod environment;
pub mod extractor;
pub mod models;
pub mod template;

pub use actions::{Action, ActionCondition, ActionError, ActionEvent, ActionsRunner, EventSink};
pub use config::{ProcessOptions, RunnerConfig};
pub use environment::{EnvironmentProvider, EnvironmentSnapshot, Variable};
pub use extractor::{RequestData, RequestDataExtractor};
pub use models::{ActionType, EditorRequest, Response, TransportRequest};
pub use template::{ExpressionEngine, TemplateEvaluator};
