//! Data source configuration shared by conditions and actions.

use crate::conditions::Operator;
use crate::models::ActionType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a value is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    /// A URL or one of its parts
    #[default]
    Url,
    /// The header block or a single header
    Headers,
    /// The response status code
    Status,
    /// The HTTP method
    Method,
    /// A JSON or XML body
    Body,
    /// A literal value from the configuration
    Value,
}

/// Raw iterator settings as stored in a document.
///
/// Fields are optional so incomplete settings survive a round trip; see
/// [`IterableDescriptor`](super::IterableDescriptor) for validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IteratorConfiguration {
    /// Dotted path of the value compared in each element
    #[serde(default)]
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,

    /// Value the element is compared against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
}

/// Describes which value an action or condition reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConfiguration {
    pub source: DataSourceKind,

    /// Request or response side
    #[serde(rename = "type", default)]
    pub kind: ActionType,

    /// Dotted path into the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Literal value used with [`DataSourceKind::Value`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterator_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterator: Option<IteratorConfiguration>,
}

impl DataSourceConfiguration {
    /// Creates a configuration reading `source` on the `kind` side.
    pub fn new(kind: ActionType, source: DataSourceKind) -> Self {
        Self {
            source,
            kind,
            ..Self::default()
        }
    }

    /// Returns the configuration with a path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Returns the configuration with an enabled iterator.
    pub fn with_iterator(mut self, iterator: IteratorConfiguration) -> Self {
        self.iterator_enabled = Some(true);
        self.iterator = Some(iterator);
        self
    }

    /// The path, treating an empty string as no path.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref().filter(|p| !p.is_empty())
    }

    /// The iterator, only when it is enabled.
    pub fn active_iterator(&self) -> Option<&IteratorConfiguration> {
        if self.iterator_enabled == Some(true) {
            self.iterator.as_ref()
        } else {
            None
        }
    }
}
