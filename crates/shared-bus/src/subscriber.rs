//! # Subscribers
//!
//! The subscription side of the bus: the [`Subscriber`] seam, closure
//! adapters, the per-topic registry and the [`Subscription`] handle.

use crate::error::SubscriberError;
use async_trait::async_trait;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use tracing::{debug, warn};

/// Something that listens on a topic.
///
/// `notify` serves the synchronous publish path and must run to completion.
/// `notify_async` serves the asynchronous path and is awaited before the
/// next subscriber in the pass is reached. `value` is `None` when the topic
/// was never published.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Handle a value delivered by a synchronous publish or by replay.
    fn notify(&self, value: Option<&Value>) -> Result<(), SubscriberError>;

    /// Handle a value delivered by an asynchronous publish.
    async fn notify_async(&self, value: Option<Value>) -> Result<(), SubscriberError> {
        self.notify(value.as_ref())
    }
}

/// Adapter turning a synchronous closure into a [`Subscriber`].
pub struct FnSubscriber<F> {
    callback: F,
}

impl<F> FnSubscriber<F>
where
    F: Fn(Option<&Value>) -> Result<(), SubscriberError> + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

#[async_trait]
impl<F> Subscriber for FnSubscriber<F>
where
    F: Fn(Option<&Value>) -> Result<(), SubscriberError> + Send + Sync,
{
    fn notify(&self, value: Option<&Value>) -> Result<(), SubscriberError> {
        (self.callback)(value)
    }
}

/// Adapter turning a closure that returns a future into a [`Subscriber`].
///
/// In the asynchronous path the future is awaited. In the synchronous path
/// (publish, replay-on-subscribe) it is started but not awaited: it is polled
/// once in place, and if it is not finished the remainder runs as a task on
/// the current tokio runtime, or on a detached thread when no runtime is
/// running. The publisher never waits for it. A started-but-not-awaited
/// future cannot fail the publish; its error is logged instead.
pub struct AsyncFnSubscriber<F> {
    callback: F,
}

impl<F, Fut> AsyncFnSubscriber<F>
where
    F: Fn(Option<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), SubscriberError>> + Send + 'static,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }

    fn start(&self, value: Option<Value>) -> BoxFuture<'static, Result<(), SubscriberError>> {
        Box::pin((self.callback)(value))
    }
}

#[async_trait]
impl<F, Fut> Subscriber for AsyncFnSubscriber<F>
where
    F: Fn(Option<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), SubscriberError>> + Send + 'static,
{
    fn notify(&self, value: Option<&Value>) -> Result<(), SubscriberError> {
        let mut fut = self.start(value.cloned());

        let mut cx = Context::from_waker(futures::task::noop_waker_ref());
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(Err(e)) => warn!(error = %e, "Detached async subscriber failed"),
            Poll::Ready(Ok(())) => {}
            Poll::Pending => match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        if let Err(e) = fut.await {
                            warn!(error = %e, "Detached async subscriber failed");
                        }
                    });
                }
                Err(_) => spawn_detached(fut),
            },
        }
        Ok(())
    }

    async fn notify_async(&self, value: Option<Value>) -> Result<(), SubscriberError> {
        self.start(value).await
    }
}

/// Finish a pending subscriber future off the publisher's thread.
fn spawn_detached(fut: BoxFuture<'static, Result<(), SubscriberError>>) {
    let spawned = std::thread::Builder::new()
        .name("bus-detached-subscriber".into())
        .spawn(move || {
            if let Err(e) = futures::executor::block_on(fut) {
                warn!(error = %e, "Detached async subscriber failed");
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "Could not start detached async subscriber, dropping it");
    }
}

/// Identity of one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

struct Entry {
    id: SubscriberId,
    subscriber: Arc<dyn Subscriber>,
}

/// Topic to ordered list of subscribers.
///
/// The same subscriber may be registered more than once; every registration
/// gets its own [`SubscriberId`] and is removed independently.
#[derive(Default)]
pub struct SubscriberRegistry {
    topics: HashMap<String, Vec<Entry>>,
    next_id: u64,
}

impl SubscriberRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `subscriber` to the end of `topic`'s list.
    pub fn register(&mut self, topic: &str, subscriber: Arc<dyn Subscriber>) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.topics
            .entry(topic.to_string())
            .or_default()
            .push(Entry { id, subscriber });
        id
    }

    /// Remove one registration, handing back the subscriber so the caller
    /// can drop it after releasing the lock. `None` if it was already gone.
    pub fn remove(&mut self, topic: &str, id: SubscriberId) -> Option<Arc<dyn Subscriber>> {
        let entries = self.topics.get_mut(topic)?;
        let index = entries.iter().position(|e| e.id == id)?;
        let entry = entries.remove(index);
        if entries.is_empty() {
            self.topics.remove(topic);
        }
        Some(entry.subscriber)
    }

    /// Owned copy of `topic`'s subscribers in registration order.
    ///
    /// Notification iterates this copy, so registrations added or removed
    /// while a pass is running only show up in the next pass.
    #[must_use]
    pub fn snapshot(&self, topic: &str) -> Vec<Arc<dyn Subscriber>> {
        self.topics
            .get(topic)
            .map(|entries| entries.iter().map(|e| e.subscriber.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of registrations on `topic`.
    #[must_use]
    pub fn len(&self, topic: &str) -> usize {
        self.topics.get(topic).map_or(0, Vec::len)
    }

    /// Number of registrations across all topics.
    #[must_use]
    pub fn total(&self) -> usize {
        self.topics.values().map(Vec::len).sum()
    }

    /// Remove every registration, handing the subscribers back to be
    /// dropped outside the lock.
    pub fn clear(&mut self) -> Vec<Arc<dyn Subscriber>> {
        self.topics
            .drain()
            .flat_map(|(_, entries)| entries.into_iter().map(|e| e.subscriber))
            .collect()
    }
}

pub(crate) type SharedRegistry = Arc<RwLock<SubscriberRegistry>>;

/// Handle for one registration.
///
/// Dropping the handle unsubscribes. Use [`Subscription::detach`] to keep
/// the registration for the lifetime of the bus instead.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<RwLock<SubscriberRegistry>>,
    topic: String,
    id: SubscriberId,
    active: AtomicBool,
    detached: bool,
}

impl Subscription {
    pub(crate) fn new(registry: &SharedRegistry, topic: &str, id: SubscriberId) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            topic: topic.to_string(),
            id,
            active: AtomicBool::new(true),
            detached: false,
        }
    }

    /// Stop future deliveries. Calling it again is a no-op.
    ///
    /// A notification pass already running for this topic is not affected.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let removed = registry.write().remove(&self.topic, self.id);
        if removed.is_some() {
            debug!(topic = %self.topic, id = %self.id, "Subscription removed");
        }
    }

    /// Whether `unsubscribe` has not been called yet.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Keep the registration alive without holding the handle.
    pub fn detach(mut self) {
        self.detached = true;
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn id(&self) -> SubscriberId {
        self.id
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.detached {
            self.unsubscribe();
        }
    }
}
