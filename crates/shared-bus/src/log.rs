//! # Message Log
//!
//! Last value published per topic. No history is kept.

use serde_json::Value;
use std::collections::HashMap;

/// In-memory map of topic to most recent value.
///
/// A topic that was never published has no entry (`None`). Clearing a topic
/// stores `Value::Null`, which keeps the entry.
#[derive(Debug, Default)]
pub struct MessageLog {
    entries: HashMap<String, Value>,
}

impl MessageLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` as the current value for `topic`, replacing any previous one.
    pub fn record(&mut self, topic: &str, value: Value) {
        self.entries.insert(topic.to_string(), value);
    }

    /// Current value for `topic`, or `None` if it was never published.
    #[must_use]
    pub fn get(&self, topic: &str) -> Option<&Value> {
        self.entries.get(topic)
    }

    /// Every topic that currently has an entry.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
