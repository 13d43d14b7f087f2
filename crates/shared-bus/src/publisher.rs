//! # Publish Pipeline
//!
//! Both entry points follow the same three steps:
//!
//! 1. **LOG** - record the value as the topic's current value
//! 2. **NOTIFY** - deliver it to a snapshot of the topic's subscribers, in
//!    registration order
//! 3. **WRITE-BACK** - mirror the topic to the storage provider, unless no
//!    provider is bound or the topic is excluded
//!
//! The synchronous path runs every subscriber to completion. A subscriber
//! that publishes from inside its callback starts a nested pass that
//! finishes before the outer pass continues. The asynchronous path awaits
//! each subscriber in turn and only writes back once all of them settled.
//!
//! A failing subscriber ends the pass: later subscribers are not notified,
//! write-back is skipped and the error is returned to the publisher. The log
//! already holds the new value at that point.
//!
//! No lock is held while a subscriber runs.

use crate::bus::MessageBus;
use crate::codec;
use crate::error::BusError;
use serde_json::Value;
use tracing::debug;

impl MessageBus {
    /// Publish `value` on `topic` and notify synchronously.
    ///
    /// # Errors
    ///
    /// - `BusError::Subscriber` - A subscriber failed; the pass stopped there
    /// - `BusError::Storage` - Write-back failed
    pub fn publish(&self, topic: &str, value: Value) -> Result<(), BusError> {
        self.log.write().record(topic, value.clone());
        self.notify_subscribers(topic, &value)?;
        self.update_storage(topic)
    }

    /// Publish `value` on `topic`, awaiting each subscriber before the next.
    ///
    /// Resolves only after every subscriber settled and write-back ran.
    ///
    /// # Errors
    ///
    /// Same as [`MessageBus::publish`].
    pub async fn publish_async(&self, topic: &str, value: Value) -> Result<(), BusError> {
        self.log.write().record(topic, value.clone());
        self.notify_subscribers_async(topic, &value).await?;
        self.update_storage(topic)
    }

    /// Publish `null` on `topic`.
    pub fn clear(&self, topic: &str) -> Result<(), BusError> {
        self.publish(topic, Value::Null)
    }

    /// Clear every topic that has a value in the log. Order across topics is
    /// unspecified.
    pub fn clear_all(&self) -> Result<(), BusError> {
        let topics = self.log.read().topics();
        debug!(topics = topics.len(), "Clearing all topics");

        for topic in topics {
            self.clear(&topic)?;
        }
        Ok(())
    }

    fn notify_subscribers(&self, topic: &str, value: &Value) -> Result<(), BusError> {
        let subscribers = self.registry.read().snapshot(topic);
        debug!(topic = %topic, subscribers = subscribers.len(), "Message published");

        for subscriber in subscribers {
            subscriber
                .notify(Some(value))
                .map_err(|source| BusError::Subscriber {
                    topic: topic.to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    async fn notify_subscribers_async(&self, topic: &str, value: &Value) -> Result<(), BusError> {
        let subscribers = self.registry.read().snapshot(topic);
        debug!(topic = %topic, subscribers = subscribers.len(), "Message published (async)");

        for subscriber in subscribers {
            subscriber
                .notify_async(Some(value.clone()))
                .await
                .map_err(|source| BusError::Subscriber {
                    topic: topic.to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Mirror the topic's current log value to storage. Reads the log at
    /// write time, so a nested publish on the same topic wins.
    fn update_storage(&self, topic: &str) -> Result<(), BusError> {
        let Some(storage) = self.storage.read().clone() else {
            return Ok(());
        };
        if !self.policy.read().is_included(topic) {
            debug!(topic = %topic, "Write-back skipped (excluded)");
            return Ok(());
        }
        let Some(value) = self.get_last(topic) else {
            return Ok(());
        };

        storage.set_item(topic, &codec::encode(&value))?;
        Ok(())
    }
}
