//! # Declared Topics
//!
//! Every topic the application publishes on, with its value type. Spellings
//! must be unique across the list; [`Messages::registry`] enforces it.

use crate::toast::ToastConfig;
use shared_bus::{BusError, Channel, TopicRegistry};

/// Current value of the counter.
pub const SPIT_COUNTER: Channel<i64> = Channel::new("SpitCounter");

/// Toasts currently on screen, oldest first.
pub const TOASTS: Channel<Vec<ToastConfig>> = Channel::new("Toasts");

/// Namespace for the declared topic list.
pub struct Messages;

impl Messages {
    /// Every declared topic name.
    pub const ALL: [&'static str; 2] = [SPIT_COUNTER.topic(), TOASTS.topic()];

    /// Registry of the declared topics.
    ///
    /// # Errors
    ///
    /// - `BusError::DuplicateTopic` - Two declarations share a spelling
    pub fn registry() -> Result<TopicRegistry, BusError> {
        TopicRegistry::from_topics(Self::ALL)
    }
}
