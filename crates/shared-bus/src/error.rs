//! # Bus Errors
//!
//! Error types shared by the bus core, the storage port and subscribers.

use thiserror::Error;

/// Errors surfaced by bus operations.
#[derive(Debug, Error)]
pub enum BusError {
    /// A subscriber failed while being notified. The notification pass
    /// stopped at this subscriber.
    #[error("subscriber on topic '{topic}' failed")]
    Subscriber {
        topic: String,
        source: SubscriberError,
    },

    /// The bound storage provider failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A typed value could not be converted to JSON.
    #[error("failed to encode value for topic '{topic}'")]
    Encode {
        topic: String,
        source: serde_json::Error,
    },

    /// The value held for a topic does not match the channel's type.
    #[error("value on topic '{topic}' does not match the channel type")]
    Decode {
        topic: String,
        source: serde_json::Error,
    },

    /// A topic spelling was declared twice.
    #[error("topic '{0}' is already declared")]
    DuplicateTopic(String),
}

/// Errors returned by a subscriber callback.
#[derive(Debug, Error)]
pub enum SubscriberError {
    /// The subscriber refused the message.
    #[error("{0}")]
    Rejected(String),

    /// The message could not be decoded into the subscriber's type.
    #[error("undecodable message")]
    Decode(#[from] serde_json::Error),

    /// A publish made from inside the callback failed.
    #[error(transparent)]
    Nested(Box<BusError>),
}

impl SubscriberError {
    /// Build a rejection from any displayable reason.
    pub fn rejected(reason: impl std::fmt::Display) -> Self {
        Self::Rejected(reason.to_string())
    }
}

impl From<BusError> for SubscriberError {
    fn from(err: BusError) -> Self {
        Self::Nested(Box::new(err))
    }
}

/// Storage provider errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// I/O error during read/write.
    #[error("storage I/O error: {message}")]
    Io { message: String },

    /// The persisted store could not be parsed.
    #[error("storage corruption: {message}")]
    Corruption { message: String },
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io {
            message: err.to_string(),
        }
    }
}
