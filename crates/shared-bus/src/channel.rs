//! # Typed Channels
//!
//! A [`Channel<T>`] binds a topic name to a value type, so producers and
//! consumers agree on the shape of a topic at compile time. The bus itself
//! still stores `serde_json::Value`; the channel converts at the edges.
//!
//! ```ignore
//! const COUNTER: Channel<i64> = Channel::new("counter");
//!
//! let sub = COUNTER.subscribe(&bus, |count| {
//!     println!("count is {}", count.unwrap_or(0));
//!     Ok(())
//! })?;
//! COUNTER.publish(&bus, &1)?;
//! ```

use crate::bus::MessageBus;
use crate::error::{BusError, SubscriberError};
use crate::subscriber::Subscription;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use tracing::warn;

/// A topic with a fixed value type.
pub struct Channel<T> {
    topic: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Channel<T> {
    #[must_use]
    pub const fn new(topic: &'static str) -> Self {
        Self {
            topic,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn topic(&self) -> &'static str {
        self.topic
    }
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Channel<T> {}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Channel").field(&self.topic).finish()
    }
}

/// Undefined and `null` both decode to `None`.
fn decode<T: DeserializeOwned>(value: Option<&Value>) -> Result<Option<T>, serde_json::Error> {
    match value {
        None => Ok(None),
        Some(v) => serde_json::from_value(v.clone()),
    }
}

fn decode_lenient<T: DeserializeOwned>(topic: &str, value: Option<&Value>) -> Option<T> {
    decode(value).unwrap_or_else(|e| {
        warn!(topic = %topic, error = %e, "Ignoring value that does not fit the channel type");
        None
    })
}

impl<T> Channel<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    fn encode(&self, value: &T) -> Result<Value, BusError> {
        serde_json::to_value(value).map_err(|source| BusError::Encode {
            topic: self.topic.to_string(),
            source,
        })
    }

    /// Publish synchronously.
    pub fn publish(&self, bus: &MessageBus, value: &T) -> Result<(), BusError> {
        bus.publish(self.topic, self.encode(value)?)
    }

    /// Publish, awaiting every subscriber.
    pub async fn publish_async(&self, bus: &MessageBus, value: &T) -> Result<(), BusError> {
        let value = self.encode(value)?;
        bus.publish_async(self.topic, value).await
    }

    /// Publish `null`.
    pub fn clear(&self, bus: &MessageBus) -> Result<(), BusError> {
        bus.clear(self.topic)
    }

    /// Current value, `None` if never published or cleared.
    ///
    /// # Errors
    ///
    /// - `BusError::Decode` - The logged value does not fit `T`
    pub fn last(&self, bus: &MessageBus) -> Result<Option<T>, BusError> {
        decode(bus.get_last(self.topic).as_ref()).map_err(|source| BusError::Decode {
            topic: self.topic.to_string(),
            source,
        })
    }

    /// Subscribe with a typed synchronous callback. A value that does not
    /// fit `T` fails the callback with `SubscriberError::Decode`.
    pub fn subscribe<F>(&self, bus: &MessageBus, callback: F) -> Result<Subscription, BusError>
    where
        F: Fn(Option<T>) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        bus.subscribe_fn(self.topic, move |value: Option<&Value>| {
            callback(decode(value)?)
        })
    }

    /// Like [`Channel::last`], but a value that does not fit `T` is logged
    /// and read as `None`.
    pub fn last_lenient(&self, bus: &MessageBus) -> Option<T> {
        let topic = self.topic;
        decode_lenient(topic, bus.get_last(topic).as_ref())
    }

    /// Subscribe with a typed synchronous callback that never fails on
    /// shape. A value that does not fit `T` is logged and delivered as
    /// `None`.
    pub fn subscribe_lenient<F>(
        &self,
        bus: &MessageBus,
        callback: F,
    ) -> Result<Subscription, BusError>
    where
        F: Fn(Option<T>) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        let topic = self.topic;
        bus.subscribe_fn(topic, move |value: Option<&Value>| {
            callback(decode_lenient(topic, value))
        })
    }

    /// Subscribe with a typed asynchronous callback.
    pub fn subscribe_async<F, Fut>(
        &self,
        bus: &MessageBus,
        callback: F,
    ) -> Result<Subscription, BusError>
    where
        F: Fn(Option<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), SubscriberError>> + Send + 'static,
    {
        bus.subscribe_async_fn(
            self.topic,
            move |value: Option<Value>| -> BoxFuture<'static, Result<(), SubscriberError>> {
                match decode::<T>(value.as_ref()) {
                    Ok(typed) => Box::pin(callback(typed)),
                    Err(e) => Box::pin(async move { Err(SubscriberError::Decode(e)) }),
                }
            },
        )
    }
}
