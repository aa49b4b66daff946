//! Conditions and runnables.
//!
//! A runnable ([`ActionCondition`]) pairs a [`Condition`] with the actions to
//! execute when the condition is satisfied.

use super::{Action, ActionError};
use crate::conditions::{check_condition, Operator};
use crate::extractor::{DataSourceConfiguration, DataSourceKind, ExtractError, RequestDataExtractor};
use crate::models::ActionType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A check of one value read from the exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Where the checked value is read from
    #[serde(flatten)]
    pub source: DataSourceConfiguration,

    #[serde(default)]
    pub operator: Operator,

    /// Value the extracted value is compared against
    #[serde(default)]
    pub predicted_value: Value,

    /// Skip the check and always pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_pass: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<Value>,
}

impl Condition {
    /// Whether the check is skipped.
    pub fn always_passes(&self) -> bool {
        self.always_pass == Some(true)
    }

    /// Reads the value and checks it.
    pub fn check(&self, extractor: &RequestDataExtractor<'_>) -> Result<bool, ExtractError> {
        if self.always_passes() {
            return Ok(true);
        }
        let value = extractor.extract(&self.source)?.unwrap_or(Value::Null);
        Ok(check_condition(&value, &self.operator, &self.predicted_value))
    }
}

/// A condition with the actions it guards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCondition {
    pub condition: Condition,

    /// Request or response side
    #[serde(rename = "type", default)]
    pub kind: ActionType,

    #[serde(default)]
    pub actions: Vec<Action>,

    #[serde(default)]
    pub enabled: bool,
}

impl ActionCondition {
    /// Creates an enabled runnable without actions.
    pub fn new(kind: ActionType, condition: Condition) -> Self {
        Self {
            condition,
            kind,
            actions: Vec::new(),
            enabled: true,
        }
    }

    /// The condition of a newly created runnable: always passing, reading the
    /// URL of the given side.
    pub fn default_condition(kind: ActionType) -> Condition {
        Condition {
            source: DataSourceConfiguration {
                path: Some(String::new()),
                value: Some(Value::String(String::new())),
                ..DataSourceConfiguration::new(kind, DataSourceKind::Url)
            },
            operator: Operator::Equal,
            predicted_value: Value::String(String::new()),
            always_pass: Some(true),
            view: None,
        }
    }

    /// Wraps a standalone action in an always-passing runnable.
    ///
    /// Documents written before runnables existed store actions directly on
    /// the request.
    pub fn import_action(action: Action) -> Self {
        let kind = action.kind;
        let mut runnable = Self::new(kind, Self::default_condition(kind));
        runnable.enabled = action.enabled;
        runnable.actions.push(action);
        runnable
    }

    /// Reads a runnable from a JSON document.
    pub fn from_json(value: Value) -> Result<Self, ActionError> {
        serde_json::from_value(value).map_err(|e| ActionError::invalid_config("runnable", e))
    }

    /// Serializes the runnable into its document shape.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Appends an action.
    pub fn add(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Actions that will run when the condition is satisfied.
    pub fn enabled_actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(|action| action.enabled)
    }

    /// Whether the actions of this runnable should run.
    ///
    /// A disabled runnable is never satisfied, even with `alwaysPass`.
    pub fn satisfied(&self, extractor: &RequestDataExtractor<'_>) -> Result<bool, ExtractError> {
        if !self.enabled {
            return Ok(false);
        }
        self.condition.check(extractor)
    }
}

/// Reads runnables from a list that may mix runnables and legacy standalone
/// actions. Entries that are neither are skipped.
///
/// # Examples
///
/// ```
/// use request_actions::actions::map_runnables;
/// use serde_json::json;
///
/// let runnables = map_runnables(vec![
///     json!({"type": "response", "name": "set-variable", "enabled": true}),
///     json!({"condition": {"source": "status", "type": "response"}, "enabled": true}),
/// ]);
/// assert_eq!(runnables.len(), 2);
/// assert_eq!(runnables[0].actions[0].name, "set-variable");
/// ```
pub fn map_runnables(values: Vec<Value>) -> Vec<ActionCondition> {
    values
        .into_iter()
        .filter_map(|value| {
            let result = if value.get("condition").is_some() {
                ActionCondition::from_json(value)
            } else {
                Action::from_json(value).map(ActionCondition::import_action)
            };
            match result {
                Ok(runnable) => Some(runnable),
                Err(e) => {
                    log::warn!("Skipping invalid runnable: {}", e);
                    None
                }
            }
        })
        .collect()
}
