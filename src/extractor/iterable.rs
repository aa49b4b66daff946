//! Validated iterator descriptors.

use super::source::IteratorConfiguration;
use crate::coerce::is_truthy;
use crate::conditions::{check_condition, Operator};
use serde_json::Value;

/// An "iterate and match" specification.
///
/// Selects one element of an array (or one entry of an object) whose value
/// at `path` satisfies `operator` against `condition`.
#[derive(Debug, Clone, PartialEq)]
pub struct IterableDescriptor {
    pub path: Vec<String>,
    pub operator: Operator,
    pub condition: Value,
}

impl IterableDescriptor {
    /// Builds a descriptor, or `None` when the settings are incomplete or the
    /// operator cannot be used for iteration.
    pub fn from_config(config: &IteratorConfiguration) -> Option<Self> {
        Self::new(&config.path, config.operator.clone()?, config.condition.clone()?)
    }

    /// Builds a descriptor from its parts, or `None` when it would be invalid.
    pub fn new(path: &str, operator: Operator, condition: Value) -> Option<Self> {
        if path.is_empty() || !operator.is_iterator_operator() || !is_truthy(&condition) {
            return None;
        }
        Some(Self {
            path: path.split('.').map(str::to_string).collect(),
            operator,
            condition,
        })
    }

    /// Whether the path uses the legacy convention (`items.*.name`).
    pub fn is_legacy(&self) -> bool {
        self.path.iter().any(|segment| segment == "*")
    }

    /// Tests one candidate element.
    pub fn matches(&self, item: &Value) -> bool {
        let mut current = item;
        for segment in &self.path {
            current = match child(current, segment) {
                Some(next) => next,
                None => return false,
            };
        }
        check_condition(current, &self.operator, &self.condition)
    }
}

/// Object key or array index lookup.
pub(crate) fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}
