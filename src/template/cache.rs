//! Storage for results of grouped stateful functions.
//!
//! `now(1)` and `random(1)` must return the same value every time they appear
//! while the same evaluator is in use. Every [`TemplateEvaluator`] owns one
//! [`FunctionCache`]; there is no process-wide store.
//!
//! [`TemplateEvaluator`]: super::TemplateEvaluator

use std::collections::HashMap;
use std::sync::Mutex;

/// Map of `function -> group -> value`.
#[derive(Debug, Default)]
pub struct FunctionCache {
    entries: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl FunctionCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for a function call group.
    pub fn get(&self, function: &str, group: &str) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        entries.get(function)?.get(group).cloned()
    }

    /// Stores a value for a function call group, replacing any previous one.
    pub fn set(&self, function: &str, group: &str, value: impl Into<String>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries
                .entry(function.to_string())
                .or_default()
                .insert(group.to_string(), value.into());
        }
    }

    /// Returns the cached value or computes, stores and returns a new one.
    pub fn get_or_insert_with<F>(&self, function: &str, group: &str, compute: F) -> String
    where
        F: FnOnce() -> String,
    {
        if let Some(value) = self.get(function, group) {
            return value;
        }
        let value = compute();
        self.set(function, group, value.clone());
        value
    }

    /// Removes every group cached for a single function.
    pub fn clear_function(&self, function: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(function);
        }
    }

    /// Removes everything.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Number of cached groups across all functions.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .map(|entries| entries.values().map(HashMap::len).sum())
            .unwrap_or(0)
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
