//! # App Services
//!
//! The application's bus consumers. None of them talk to each other; each
//! reads and writes its topic through the shared bus.
//!
//! - `messages` - declared topics and their value types
//! - `counter` - the counter shown on the main page, plus its reset action
//! - `toast` - queue of toast notifications

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod counter;
pub mod error;
pub mod messages;
pub mod toast;

pub use counter::CounterService;
pub use error::ServiceError;
pub use messages::Messages;
pub use toast::{ToastConfig, ToastService, ToastVariant};
