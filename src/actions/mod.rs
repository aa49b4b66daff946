//! Condition-gated request and response actions.
//!
//! A request document carries lists of runnables ([`ActionCondition`]) for
//! the request and the response phase. Each runnable holds a [`Condition`]
//! and the [`Action`]s executed when it is satisfied. The [`ActionsRunner`]
//! drives the whole pipeline; executors emit [`ActionEvent`]s to a host
//! supplied [`EventSink`].

pub mod condition;
pub mod error;
pub mod events;
pub mod executors;
pub mod model;
pub mod runner;

pub use condition::{map_runnables, ActionCondition, Condition};
pub use error::{ActionError, SinkError};
pub use events::{ActionEvent, ChannelSink, Cookie, EventSink, RecordingSink};
pub use executors::{
    ActionExecutor, DeleteCookieExecutor, ExecutorRegistry, SetCookieExecutor, SetVariableExecutor,
};
pub use model::{
    Action, ActionConfig, ActionKind, DeleteCookieConfig, SetCookieConfig, SetVariableConfig,
    DEFAULT_PRIORITY,
};
pub use runner::ActionsRunner;
