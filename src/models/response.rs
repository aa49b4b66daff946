//! Response data model.

use super::headers::get_header;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Represents an HTTP response received for a [`TransportRequest`].
///
/// [`TransportRequest`]: super::TransportRequest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// HTTP status code (e.g., 200, 404, 500).
    pub status: u16,

    /// HTTP status text (e.g., "OK", "Not Found").
    #[serde(default)]
    pub status_text: String,

    /// Raw response header block.
    #[serde(default)]
    pub headers: String,

    /// Response payload, usually a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    /// Total request duration in milliseconds.
    #[serde(default)]
    pub loading_time: f64,
}

impl Response {
    /// Creates a new Response with the given status code and text.
    pub fn new(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            ..Self::default()
        }
    }

    /// Returns the response with the header block replaced.
    pub fn with_headers(mut self, headers: impl Into<String>) -> Self {
        self.headers = headers.into();
        self
    }

    /// Returns the response with a payload.
    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Checks if the response status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Gets the Content-Type header value if present.
    pub fn content_type(&self) -> Option<String> {
        get_header(&self.headers, "content-type")
    }
}
