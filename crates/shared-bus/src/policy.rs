//! # Persistence Policy
//!
//! Topics are persisted unless explicitly excluded. The exclusion set lives
//! only in memory and only affects future write-backs; values already in the
//! storage provider are left alone.

use std::collections::HashSet;

/// Per-topic opt-out from storage write-back.
#[derive(Debug, Default, Clone)]
pub struct PersistencePolicy {
    excluded: HashSet<String>,
}

impl PersistencePolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop writing `topic` to storage.
    pub fn exclude(&mut self, topic: &str) {
        self.excluded.insert(topic.to_string());
    }

    /// Resume writing `topic` to storage.
    pub fn include(&mut self, topic: &str) {
        self.excluded.remove(topic);
    }

    #[must_use]
    pub fn is_included(&self, topic: &str) -> bool {
        !self.excluded.contains(topic)
    }

    /// Currently excluded topics, sorted.
    #[must_use]
    pub fn excluded(&self) -> Vec<String> {
        let mut topics: Vec<_> = self.excluded.iter().cloned().collect();
        topics.sort();
        topics
    }
}
