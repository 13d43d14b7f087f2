//! # Counter Service
//!
//! Mirrors the counter topic into a local value and publishes changes.
//! The count only changes when the bus delivers a new value, so every
//! counter instance in the process shows the same number.

use crate::error::ServiceError;
use crate::messages::SPIT_COUNTER;
use shared_bus::{MessageBus, Subscription};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::debug;

pub struct CounterService {
    bus: Arc<MessageBus>,
    count: Arc<AtomicI64>,
    subscription: Option<Subscription>,
}

impl CounterService {
    /// Subscribe to the counter topic. The current value is picked up
    /// immediately; a missing, cleared or unreadable value counts as 0.
    pub fn new(bus: Arc<MessageBus>) -> Result<Self, ServiceError> {
        let count = Arc::new(AtomicI64::new(0));
        let sink = count.clone();
        let subscription = SPIT_COUNTER.subscribe_lenient(&bus, move |value| {
            sink.store(value.unwrap_or(0), Ordering::SeqCst);
            Ok(())
        })?;

        Ok(Self {
            bus,
            count,
            subscription: Some(subscription),
        })
    }

    #[must_use]
    pub fn count(&self) -> i64 {
        self.count.load(Ordering::SeqCst)
    }

    /// Publish `count + 1`.
    pub fn increment(&self) -> Result<(), ServiceError> {
        self.ensure_active()?;
        let next = self.count() + 1;
        debug!(count = next, "Incrementing counter");
        SPIT_COUNTER.publish(&self.bus, &next)?;
        Ok(())
    }

    /// Publish 0.
    pub fn reset(&self) -> Result<(), ServiceError> {
        self.ensure_active()?;
        debug!("Resetting counter");
        SPIT_COUNTER.publish(&self.bus, &0)?;
        Ok(())
    }

    /// Stop following the bus. Further calls to `increment`/`reset` fail.
    pub fn destroy(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    fn ensure_active(&self) -> Result<(), ServiceError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(ServiceError::Destroyed {
                service: "CounterService",
            })
        }
    }
}
