//! Data models for HTTP requests and responses.
//!
//! The action pipeline reads from a triad of records: the editor request,
//! the transport request that was actually sent, and the received response.

pub mod headers;
pub mod request;
pub mod response;

pub use request::{EditorRequest, RequestActions, TransportRequest};
pub use response::Response;

use serde::{Deserialize, Serialize};

/// Which side of the exchange a condition, action or data source reads from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// The request as authored in the editor
    #[default]
    Request,
    /// The transport request and the received response
    Response,
}

impl ActionType {
    /// Returns the serialized name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Request => "request",
            ActionType::Response => "response",
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
