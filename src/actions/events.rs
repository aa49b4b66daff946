//! Outbound notifications emitted by actions.
//!
//! Actions never touch the host's stores directly. Each execution emits one
//! [`ActionEvent`] to an [`EventSink`] supplied by the host.

use super::SinkError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// A cookie to store, as emitted by `set-cookie`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,

    /// Expiry as epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,

    #[serde(default)]
    pub host_only: bool,

    #[serde(default)]
    pub http_only: bool,

    #[serde(default)]
    pub secure: bool,

    /// Session cookies are dropped with the session
    #[serde(default)]
    pub session: bool,
}

/// A state change requested by an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ActionEvent {
    /// Set a variable in the active environment
    VariableSet { name: String, value: String },
    /// Store or replace a cookie
    CookieUpdate(Cookie),
    /// Remove one cookie of `url`, or all of them when `name` is `None`
    CookieDelete { url: String, name: Option<String> },
}

/// Receiver of action events.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn dispatch(&self, event: ActionEvent) -> Result<(), SinkError>;
}

/// Sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ActionEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far, in dispatch order.
    pub fn events(&self) -> Vec<ActionEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Removes and returns the received events.
    pub fn take(&self) -> Vec<ActionEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn dispatch(&self, event: ActionEvent) -> Result<(), SinkError> {
        let mut events = self
            .events
            .lock()
            .map_err(|e| SinkError(format!("recording sink poisoned: {}", e)))?;
        events.push(event);
        Ok(())
    }
}

/// Sink forwarding events over a tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<ActionEvent>,
}

impl ChannelSink {
    /// Creates a sink and the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ActionEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn dispatch(&self, event: ActionEvent) -> Result<(), SinkError> {
        self.sender
            .send(event)
            .map_err(|_| SinkError("event receiver dropped".to_string()))
    }
}
