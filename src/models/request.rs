//! Request data models.
//!
//! Two views of a request reach the action pipeline: the [`EditorRequest`]
//! as authored by the user (with its configured actions) and the
//! [`TransportRequest`] that was actually sent after variables were applied
//! and redirects followed.

use super::headers::get_header;
use crate::actions::ActionCondition;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Actions configured on a request, split by the phase they run in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestActions {
    /// Runnables executed before the request is sent
    #[serde(default)]
    pub request: Vec<ActionCondition>,

    /// Runnables executed after the response is received
    #[serde(default)]
    pub response: Vec<ActionCondition>,
}

/// A request as stored in the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorRequest {
    /// Request URL, may contain variables
    pub url: String,

    /// HTTP method, custom methods allowed
    #[serde(default = "default_method")]
    pub method: String,

    /// Raw header block
    #[serde(default)]
    pub headers: String,

    /// Request payload, usually a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    /// Configured request and response actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<RequestActions>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl EditorRequest {
    /// Creates a request without headers, payload or actions.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            headers: String::new(),
            payload: None,
            actions: None,
        }
    }

    /// Returns the request with the header block replaced.
    pub fn with_headers(mut self, headers: impl Into<String>) -> Self {
        self.headers = headers.into();
        self
    }

    /// Returns the request with a payload.
    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Returns the request with actions attached.
    pub fn with_actions(mut self, actions: RequestActions) -> Self {
        self.actions = Some(actions);
        self
    }

    /// Gets the Content-Type header value if present.
    pub fn content_type(&self) -> Option<String> {
        get_header(&self.headers, "content-type")
    }

    /// Runnables for the request phase.
    pub fn request_actions(&self) -> &[ActionCondition] {
        self.actions.as_ref().map_or(&[], |a| a.request.as_slice())
    }

    /// Runnables for the response phase.
    pub fn response_actions(&self) -> &[ActionCondition] {
        self.actions.as_ref().map_or(&[], |a| a.response.as_slice())
    }
}

/// The request as it was sent over the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportRequest {
    /// Final URL, after variables and redirects
    pub url: String,

    /// HTTP method
    #[serde(default = "default_method")]
    pub method: String,

    /// Raw header block as sent
    #[serde(default)]
    pub headers: String,

    /// Payload as sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    /// Epoch milliseconds when the request started
    #[serde(default)]
    pub start_time: i64,

    /// Epoch milliseconds when the request finished
    #[serde(default)]
    pub end_time: i64,
}

impl TransportRequest {
    /// Creates a transport request record.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            ..Self::default()
        }
    }

    /// Returns the record with the header block replaced.
    pub fn with_headers(mut self, headers: impl Into<String>) -> Self {
        self.headers = headers.into();
        self
    }
}
