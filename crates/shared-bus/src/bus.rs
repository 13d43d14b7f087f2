//! # Message Bus
//!
//! The bus core: owns the message log, the subscriber registry, the
//! persistence policy and the bound storage provider, and drives their
//! lifecycle. The publish pipeline lives in [`crate::publisher`].
//!
//! ## Lifecycle
//!
//! ```text
//! MessageBus::new() ──→ initialize(provider) ──→ ... ──→ shutdown()
//!                            │        ↑
//!                            │        └── may be called again to rebind
//!                            ↓
//!                 replay every stored key through publish()
//! ```
//!
//! The bus is an ordinary value. The application's composition root creates
//! one, wraps it in an `Arc` and hands it to every producer and consumer.

use crate::codec;
use crate::error::{BusError, SubscriberError};
use crate::log::MessageLog;
use crate::policy::PersistencePolicy;
use crate::storage::StorageProvider;
use crate::subscriber::{
    AsyncFnSubscriber, FnSubscriber, SharedRegistry, Subscriber, SubscriberRegistry, Subscription,
};
use parking_lot::RwLock;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

/// In-process publish/subscribe register.
pub struct MessageBus {
    pub(crate) log: RwLock<MessageLog>,
    pub(crate) registry: SharedRegistry,
    pub(crate) policy: RwLock<PersistencePolicy>,
    pub(crate) storage: RwLock<Option<Arc<dyn StorageProvider>>>,
}

impl MessageBus {
    /// Create a bus with an empty log, no subscribers and no storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: RwLock::new(MessageLog::new()),
            registry: Arc::new(RwLock::new(SubscriberRegistry::new())),
            policy: RwLock::new(PersistencePolicy::new()),
            storage: RwLock::new(None),
        }
    }

    /// Bind a storage provider and replay everything it holds.
    ///
    /// Resets the persistence policy to defaults. The message log and the
    /// subscriber registry are kept, so existing subscribers observe the
    /// restored values. Each stored entry is decoded (falling back to the raw
    /// string) and published through the synchronous path, which also writes
    /// it back to the provider.
    ///
    /// # Errors
    ///
    /// - `BusError::Storage` - The provider could not be read or written
    /// - `BusError::Subscriber` - A subscriber failed during replay
    pub fn initialize(&self, provider: Arc<dyn StorageProvider>) -> Result<(), BusError> {
        *self.storage.write() = Some(provider.clone());
        *self.policy.write() = PersistencePolicy::new();

        let stored = provider.get_store()?;
        info!(entries = stored.len(), "Bus initialized, replaying persisted topics");

        for (topic, raw) in stored {
            let value = codec::decode(&raw);
            self.publish(&topic, value)?;
        }
        Ok(())
    }

    /// Flush and unbind the storage provider and drop every subscription.
    ///
    /// The log stays readable. Publishing afterwards works but is no longer
    /// persisted until the bus is initialized again.
    ///
    /// # Errors
    ///
    /// - `BusError::Storage` - The provider failed to flush
    pub fn shutdown(&self) -> Result<(), BusError> {
        let provider = self.storage.write().take();
        let dropped = self.registry.write().clear();
        debug!(subscriptions = dropped.len(), "Subscriptions dropped");
        drop(dropped);

        if let Some(provider) = provider {
            provider.flush()?;
        }
        info!("Bus shut down");
        Ok(())
    }

    /// Register `subscriber` on `topic` and immediately replay the topic's
    /// current value to it (which is `None` if never published).
    ///
    /// # Errors
    ///
    /// - `BusError::Subscriber` - The replay call failed; the registration
    ///   is rolled back
    pub fn subscribe(
        &self,
        topic: &str,
        subscriber: Arc<dyn Subscriber>,
    ) -> Result<Subscription, BusError> {
        let id = self.registry.write().register(topic, subscriber.clone());
        let subscription = Subscription::new(&self.registry, topic, id);
        debug!(topic = %topic, id = %id, "New subscription created");

        // Returning early drops the handle, which rolls the registration back.
        let current = self.get_last(topic);
        subscriber
            .notify(current.as_ref())
            .map_err(|source| BusError::Subscriber {
                topic: topic.to_string(),
                source,
            })?;

        Ok(subscription)
    }

    /// Subscribe a synchronous closure.
    pub fn subscribe_fn<F>(&self, topic: &str, callback: F) -> Result<Subscription, BusError>
    where
        F: Fn(Option<&Value>) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        self.subscribe(topic, Arc::new(FnSubscriber::new(callback)))
    }

    /// Subscribe a closure returning a future. See [`AsyncFnSubscriber`] for
    /// how it behaves on the synchronous path.
    pub fn subscribe_async_fn<F, Fut>(
        &self,
        topic: &str,
        callback: F,
    ) -> Result<Subscription, BusError>
    where
        F: Fn(Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), SubscriberError>> + Send + 'static,
    {
        self.subscribe(topic, Arc::new(AsyncFnSubscriber::new(callback)))
    }

    /// Most recent value for `topic`, or `None` if never published.
    #[must_use]
    pub fn get_last(&self, topic: &str) -> Option<Value> {
        self.log.read().get(topic).cloned()
    }

    /// Topics that currently have a value in the log.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        self.log.read().topics()
    }

    /// Number of registrations on `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.registry.read().len(topic)
    }

    /// Whether a storage provider is bound.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.storage.read().is_some()
    }

    /// Runtime persistence configuration.
    #[must_use]
    pub fn configure(&self) -> Configure<'_> {
        Configure { bus: self }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for toggling persistence of individual topics.
pub struct Configure<'a> {
    bus: &'a MessageBus,
}

impl Configure<'_> {
    /// Stop writing `topic` to storage. Already stored data is kept.
    pub fn exclude(&self, topic: &str) {
        self.bus.policy.write().exclude(topic);
        debug!(topic = %topic, "Topic excluded from persistence");
    }

    /// Resume writing `topic` to storage.
    pub fn include(&self, topic: &str) {
        self.bus.policy.write().include(topic);
        debug!(topic = %topic, "Topic included in persistence");
    }

    #[must_use]
    pub fn is_included(&self, topic: &str) -> bool {
        self.bus.policy.read().is_included(topic)
    }

    #[must_use]
    pub fn excluded(&self) -> Vec<String> {
        self.bus.policy.read().excluded()
    }
}
