//! # Topic Registry
//!
//! Declared topics must be spelled uniquely. The registry only checks the
//! topics an application declares up front; ad-hoc topic strings are still
//! accepted by the bus.

use crate::error::BusError;
use std::collections::BTreeSet;

/// Set of declared topic names.
#[derive(Debug, Default, Clone)]
pub struct TopicRegistry {
    declared: BTreeSet<&'static str>,
}

impl TopicRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list, failing on the first duplicate.
    pub fn from_topics<I>(topics: I) -> Result<Self, BusError>
    where
        I: IntoIterator<Item = &'static str>,
    {
        let mut registry = Self::new();
        for topic in topics {
            registry.declare(topic)?;
        }
        Ok(registry)
    }

    /// Declare a topic.
    ///
    /// # Errors
    ///
    /// - `BusError::DuplicateTopic` - The spelling is already declared
    pub fn declare(&mut self, topic: &'static str) -> Result<(), BusError> {
        if !self.declared.insert(topic) {
            return Err(BusError::DuplicateTopic(topic.to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, topic: &str) -> bool {
        self.declared.contains(topic)
    }

    /// Declared topics in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.declared.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.declared.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }
}
