//! Built-in action executors.
//!
//! Executors are looked up by action name in an [`ExecutorRegistry`]. Each one
//! reads its typed configuration, resolves the value it writes and emits a
//! single [`ActionEvent`].

use super::events::{ActionEvent, Cookie, EventSink};
use super::model::{Action, ActionConfig, ActionKind};
use super::ActionError;
use crate::coerce::{is_truthy, json_value_to_string};
use crate::extractor::{DataSourceConfiguration, RequestData, RequestDataExtractor};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Runs one kind of action.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(
        &self,
        action: &Action,
        data: &RequestData,
        sink: &dyn EventSink,
    ) -> Result<(), ActionError>;
}

/// Action name to executor lookup table.
#[derive(Clone)]
pub struct ExecutorRegistry {
    executors: HashMap<String, Arc<dyn ActionExecutor>>,
}

impl ExecutorRegistry {
    /// Creates an empty registry.
    pub fn empty() -> Self {
        Self {
            executors: HashMap::new(),
        }
    }

    /// Creates a registry with the built-in executors.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(ActionKind::SetVariable.as_str(), Arc::new(SetVariableExecutor));
        registry.register(ActionKind::SetCookie.as_str(), Arc::new(SetCookieExecutor));
        registry.register(ActionKind::DeleteCookie.as_str(), Arc::new(DeleteCookieExecutor));
        registry
    }

    /// Registers or replaces the executor for `name`.
    pub fn register(&mut self, name: impl Into<String>, executor: Arc<dyn ActionExecutor>) {
        self.executors.insert(name.into(), executor);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ActionExecutor>> {
        self.executors.get(name).cloned()
    }
}

impl Default for ExecutorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.executors.keys().collect();
        names.sort();
        f.debug_struct("ExecutorRegistry").field("executors", &names).finish()
    }
}

/// Reads the value an action writes.
///
/// A falsy value fails the action only when it has `failOnError`; otherwise
/// the action is skipped.
fn read_value(
    action: &Action,
    source: &DataSourceConfiguration,
    data: &RequestData,
) -> Result<Option<Value>, ActionError> {
    let value = RequestDataExtractor::new(data).extract(source)?;
    match value {
        Some(value) if is_truthy(&value) => Ok(Some(value)),
        _ if action.fail_on_error => Err(ActionError::MissingValue {
            name: action.name.clone(),
        }),
        _ => {
            log::debug!("No value for the action {}, skipping", action.name);
            Ok(None)
        }
    }
}

/// Error for an action whose name selects another executor's configuration.
fn mismatched_config(action: &Action, expected: ActionKind) -> ActionError {
    ActionError::invalid_config(
        &action.name,
        format!("expected a {} configuration", expected.as_str()),
    )
}

/// The URL a cookie action applies to.
fn cookie_url(
    action: &Action,
    use_request_url: bool,
    url: Option<&str>,
    data: &RequestData,
) -> Result<String, ActionError> {
    let url = if use_request_url {
        Some(data.effective_url())
    } else {
        url
    };
    match url.filter(|u| !u.is_empty()) {
        Some(url) => Ok(url.to_string()),
        None => Err(ActionError::invalid_config(&action.name, "cookie url is required")),
    }
}

/// Parses an expiry date as epoch milliseconds, RFC 3339 or RFC 2822.
fn parse_expires(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(millis) = value.parse::<i64>() {
        return Some(millis);
    }
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .ok()
        .map(|date| date.with_timezone(&Utc).timestamp_millis())
}

/// `set-variable`: writes the read value into a variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetVariableExecutor;

#[async_trait]
impl ActionExecutor for SetVariableExecutor {
    async fn execute(
        &self,
        action: &Action,
        data: &RequestData,
        sink: &dyn EventSink,
    ) -> Result<(), ActionError> {
        let ActionConfig::SetVariable(config) = ActionConfig::from_action(action)? else {
            return Err(mismatched_config(action, ActionKind::SetVariable));
        };
        if config.name.is_empty() {
            return Err(ActionError::invalid_config(&action.name, "variable name is required"));
        }
        let Some(value) = read_value(action, &config.source, data)? else {
            return Ok(());
        };
        let value = json_value_to_string(&value);
        log::debug!("Setting variable {}", config.name);
        sink.dispatch(ActionEvent::VariableSet {
            name: config.name,
            value,
        })
        .await?;
        Ok(())
    }
}

/// `set-cookie`: stores the read value as a cookie of the request URL or a
/// configured URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetCookieExecutor;

#[async_trait]
impl ActionExecutor for SetCookieExecutor {
    async fn execute(
        &self,
        action: &Action,
        data: &RequestData,
        sink: &dyn EventSink,
    ) -> Result<(), ActionError> {
        let ActionConfig::SetCookie(config) = ActionConfig::from_action(action)? else {
            return Err(mismatched_config(action, ActionKind::SetCookie));
        };
        if config.name.is_empty() {
            return Err(ActionError::invalid_config(&action.name, "cookie name is required"));
        }
        let Some(value) = read_value(action, &config.source, data)? else {
            return Ok(());
        };

        let raw_url = cookie_url(action, config.use_request_url, config.url.as_deref(), data)?;
        let url = Url::parse(&raw_url)
            .map_err(|e| ActionError::InvalidUrl(format!("{}: {}", raw_url, e)))?;
        let domain = url
            .host_str()
            .ok_or_else(|| ActionError::InvalidUrl(raw_url.clone()))?
            .to_string();

        let expires = match config.expires.as_deref().filter(|e| !e.is_empty()) {
            Some(raw) => Some(parse_expires(raw).ok_or_else(|| {
                ActionError::invalid_config(&action.name, format!("invalid expiry date {}", raw))
            })?),
            None => None,
        };

        let cookie = Cookie {
            name: config.name,
            value: json_value_to_string(&value),
            domain,
            path: url.path().to_string(),
            expires,
            host_only: config.host_only.unwrap_or(false),
            http_only: config.http_only.unwrap_or(false),
            secure: config.secure.unwrap_or(false),
            session: config.session.unwrap_or(expires.is_none()),
        };
        log::debug!("Setting cookie {} for {}", cookie.name, cookie.domain);
        sink.dispatch(ActionEvent::CookieUpdate(cookie)).await?;
        Ok(())
    }
}

/// `delete-cookie`: removes one cookie, or every cookie, of a URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteCookieExecutor;

#[async_trait]
impl ActionExecutor for DeleteCookieExecutor {
    async fn execute(
        &self,
        action: &Action,
        data: &RequestData,
        sink: &dyn EventSink,
    ) -> Result<(), ActionError> {
        let ActionConfig::DeleteCookie(config) = ActionConfig::from_action(action)? else {
            return Err(mismatched_config(action, ActionKind::DeleteCookie));
        };
        let url = cookie_url(action, config.use_request_url, config.url.as_deref(), data)?;
        let name = if config.remove_all {
            None
        } else {
            match config.name.filter(|n| !n.is_empty()) {
                Some(name) => Some(name),
                None => {
                    return Err(ActionError::invalid_config(&action.name, "cookie name is required"))
                }
            }
        };
        log::debug!("Deleting cookies of {}", url);
        sink.dispatch(ActionEvent::CookieDelete { url, name }).await?;
        Ok(())
    }
}
