//! # Shared Bus - Publish/Subscribe Register
//!
//! Components talk to each other through the bus instead of calling each
//! other directly. Producers publish values on topics; consumers subscribe
//! to topics and are handed the current value straight away, then every
//! later one.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │   Producer   │                    │   Consumer   │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  MessageBus  │ ─────────┘
//!                  │              │  subscribe()
//!                  └──────┬───────┘
//!                         │ write-back / replay
//!                         ▼
//!                  ┌──────────────┐
//!                  │   Storage    │
//!                  │   Provider   │
//!                  └──────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - **Replay-on-subscribe:** a new subscriber is called once, synchronously,
//!   with the topic's current value
//! - **Last-write-wins:** the log keeps one value per topic
//! - **Ordered fan-out:** within a topic, subscribers run in registration order
//! - **Snapshot passes:** subscribing or unsubscribing during a notification
//!   pass only affects the next pass
//! - **Selective persistence:** every topic is mirrored to storage unless
//!   excluded through [`MessageBus::configure`]
//!
//! ## Module Map
//!
//! - `bus` - lifecycle, subscribe, reads, configuration
//! - `publisher` - synchronous and asynchronous publish pipeline
//! - `subscriber` - subscriber seam, registry, subscription handles
//! - `log` / `policy` - message log and persistence exclusions
//! - `storage` / `codec` - storage provider port, adapters, text encoding
//! - `channel` / `topics` - typed topics and declared-topic registry

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bus;
pub mod channel;
pub mod codec;
pub mod error;
pub mod log;
pub mod policy;
pub mod publisher;
pub mod storage;
pub mod subscriber;
pub mod topics;

// Re-export main types
pub use bus::{Configure, MessageBus};
pub use channel::Channel;
pub use error::{BusError, StorageError, SubscriberError};
pub use log::MessageLog;
pub use policy::PersistencePolicy;
pub use storage::{FileBackedStorage, InMemoryStorage, StorageProvider};
pub use subscriber::{
    AsyncFnSubscriber, FnSubscriber, Subscriber, SubscriberId, SubscriberRegistry, Subscription,
};
pub use topics::TopicRegistry;

// Re-export so subscribers can be written without depending on serde_json directly
pub use serde_json::{json, Value};
