//! Action value objects.
//!
//! An [`Action`] is stored in request documents exactly as it serializes:
//! `type`, `name`, `enabled`, `priority`, `config`, `sync`, `failOnError` and
//! `view`. The `config` object is kept as raw JSON so placeholders inside it
//! can be evaluated before it is read as one of the typed configurations.

use super::ActionError;
use crate::extractor::DataSourceConfiguration;
use crate::models::ActionType;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Default execution priority of an action.
pub const DEFAULT_PRIORITY: i32 = 5;

/// A single side-effecting step of a runnable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Request or response side
    #[serde(rename = "type", default)]
    pub kind: ActionType,

    /// Executor name, e.g. `set-variable`
    pub name: String,

    #[serde(default)]
    pub enabled: bool,

    /// Lower priorities run first
    #[serde(default = "default_priority")]
    pub priority: i32,

    /// Executor specific configuration
    #[serde(default = "empty_object")]
    pub config: Value,

    /// When `false` the action runs without blocking the pipeline
    #[serde(default = "default_sync")]
    pub sync: bool,

    /// Whether a failure of this action fails the whole run
    #[serde(default)]
    pub fail_on_error: bool,

    /// Editor state, opaque to the runner
    #[serde(default = "empty_object")]
    pub view: Value,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

fn default_sync() -> bool {
    true
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl Action {
    /// Creates an enabled action with the default configuration of `name`.
    pub fn new(kind: ActionType, name: impl Into<String>) -> Self {
        let name = name.into();
        let config = ActionKind::parse(&name)
            .map_or_else(empty_object, |k| Action::default_config(k, kind));
        Self {
            kind,
            name,
            enabled: true,
            priority: DEFAULT_PRIORITY,
            config,
            sync: true,
            fail_on_error: false,
            view: empty_object(),
        }
    }

    /// Returns the action with `config` replaced.
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    /// Returns the action with a priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Reads an action from a JSON document.
    pub fn from_json(value: Value) -> Result<Self, ActionError> {
        serde_json::from_value(value).map_err(|e| ActionError::invalid_config("action", e))
    }

    /// Serializes the action into its document shape.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Default configuration of a new action of the given kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use request_actions::actions::{Action, ActionKind};
    /// use request_actions::models::ActionType;
    ///
    /// let config = Action::default_config(ActionKind::SetVariable, ActionType::Response);
    /// assert_eq!(config["source"]["type"], "response");
    /// ```
    pub fn default_config(kind: ActionKind, side: ActionType) -> Value {
        match kind {
            ActionKind::SetVariable => json!({
                "name": "",
                "source": {"type": side, "source": "body", "path": ""},
            }),
            ActionKind::SetCookie => json!({
                "name": "",
                "useRequestUrl": true,
                "source": {"type": side, "source": "body", "path": ""},
            }),
            ActionKind::DeleteCookie => json!({
                "name": "",
                "useRequestUrl": true,
                "removeAll": false,
            }),
        }
    }

    /// Parses `config` as the typed configuration of this action.
    pub fn typed_config<T: DeserializeOwned>(&self) -> Result<T, ActionError> {
        serde_json::from_value(self.config.clone())
            .map_err(|e| ActionError::invalid_config(&self.name, e))
    }
}

/// Built-in action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    SetVariable,
    SetCookie,
    DeleteCookie,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [
        ActionKind::SetVariable,
        ActionKind::SetCookie,
        ActionKind::DeleteCookie,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::SetVariable => "set-variable",
            ActionKind::SetCookie => "set-cookie",
            ActionKind::DeleteCookie => "delete-cookie",
        }
    }

    /// Looks up a kind by action name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration of `set-variable`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetVariableConfig {
    /// Name of the variable to set
    pub name: String,
    pub source: DataSourceConfiguration,
}

/// Configuration of `set-cookie`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCookieConfig {
    pub name: String,
    pub source: DataSourceConfiguration,

    /// Derive domain and path from the request URL instead of `url`
    #[serde(default)]
    pub use_request_url: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Expiry date, RFC 3339 or RFC 2822
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_only: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<bool>,
}

/// Configuration of `delete-cookie`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCookieConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Remove every cookie of the URL
    #[serde(default)]
    pub remove_all: bool,

    #[serde(default)]
    pub use_request_url: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Typed configuration of an action, keyed by the action name.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionConfig {
    SetVariable(SetVariableConfig),
    SetCookie(SetCookieConfig),
    DeleteCookie(DeleteCookieConfig),
}

impl ActionConfig {
    /// Parses the configuration of `action` according to its name.
    pub fn from_action(action: &Action) -> Result<Self, ActionError> {
        match ActionKind::parse(&action.name) {
            Some(ActionKind::SetVariable) => action.typed_config().map(ActionConfig::SetVariable),
            Some(ActionKind::SetCookie) => action.typed_config().map(ActionConfig::SetCookie),
            Some(ActionKind::DeleteCookie) => action.typed_config().map(ActionConfig::DeleteCookie),
            None => Err(ActionError::UnknownAction(action.name.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::DataSourceKind;

    fn document() -> Value {
        json!({
            "type": "response",
            "name": "set-variable",
            "enabled": true,
            "priority": 2,
            "config": {
                "name": "token",
                "source": {"type": "response", "source": "body", "path": "token"}
            },
            "sync": false,
            "failOnError": true,
            "view": {"opened": true}
        })
    }

    #[test]
    fn test_json_round_trip() {
        let action = Action::from_json(document()).unwrap();
        assert_eq!(action.kind, ActionType::Response);
        assert_eq!(action.priority, 2);
        assert!(!action.sync);
        assert!(action.fail_on_error);
        assert_eq!(action.to_json(), document());
    }

    #[test]
    fn test_round_trip_keeps_key_order() {
        let text = r#"{
            "name": "set-cookie",
            "config": {"source": {"source": "value", "value": "1"}, "name": "sid", "expires": ""},
            "view": {"zoom": 1, "opened": true}
        }"#;
        let action = Action::from_json(serde_json::from_str(text).unwrap()).unwrap();
        let document = action.to_json();
        let keys = |value: &Value| value.as_object().unwrap().keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys(&document["config"]), ["source", "name", "expires"]);
        assert_eq!(keys(&document["view"]), ["zoom", "opened"]);
    }

    #[test]
    fn test_defaults() {
        let action = Action::from_json(json!({"name": "delete-cookie"})).unwrap();
        assert_eq!(action.kind, ActionType::Request);
        assert!(!action.enabled);
        assert_eq!(action.priority, DEFAULT_PRIORITY);
        assert!(action.sync);
        assert!(!action.fail_on_error);
        assert_eq!(action.config, json!({}));
        assert_eq!(action.view, json!({}));
    }

    #[test]
    fn test_clone_is_deep() {
        let action = Action::from_json(document()).unwrap();
        let mut copy = action.clone();
        copy.config["name"] = json!("other");
        copy.view["opened"] = json!(false);
        assert_eq!(action.config["name"], "token");
        assert_eq!(action.view["opened"], true);
    }

    #[test]
    fn test_typed_config() {
        let action = Action::from_json(document()).unwrap();
        match ActionConfig::from_action(&action).unwrap() {
            ActionConfig::SetVariable(config) => {
                assert_eq!(config.name, "token");
                assert_eq!(config.source.source, DataSourceKind::Body);
            }
            other => panic!("unexpected config {:?}", other),
        }
    }

    #[test]
    fn test_unknown_and_invalid_configs() {
        let action = Action::new(ActionType::Request, "send-email");
        assert!(matches!(
            ActionConfig::from_action(&action),
            Err(ActionError::UnknownAction(_))
        ));

        let action =
            Action::new(ActionType::Request, "set-variable").with_config(json!({"name": 1}));
        assert!(matches!(
            ActionConfig::from_action(&action),
            Err(ActionError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_new_uses_default_config() {
        let action = Action::new(ActionType::Request, "delete-cookie");
        assert!(action.enabled);
        assert_eq!(action.config["useRequestUrl"], true);
        assert_eq!(ActionKind::parse("set-cookie"), Some(ActionKind::SetCookie));
        assert_eq!(ActionKind::parse("nope"), None);
    }
}
