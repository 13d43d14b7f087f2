//! # Toast Service
//!
//! Keeps the list of visible toasts on the bus. Every change republishes
//! the whole list so subscribers always get a complete snapshot.

use crate::error::ServiceError;
use crate::messages::TOASTS;
use serde::{Deserialize, Serialize};
use shared_bus::MessageBus;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    #[default]
    Info,
    Warning,
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastConfig {
    pub message: String,
    #[serde(default)]
    pub variant: ToastVariant,
}

impl ToastConfig {
    /// An info toast.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            variant: ToastVariant::default(),
        }
    }

    #[must_use]
    pub fn with_variant(mut self, variant: ToastVariant) -> Self {
        self.variant = variant;
        self
    }
}

pub struct ToastService {
    bus: Arc<MessageBus>,
}

impl ToastService {
    pub fn new(bus: Arc<MessageBus>) -> Self {
        Self { bus }
    }

    /// Append a toast.
    pub fn add_toast(&self, config: ToastConfig) -> Result<(), ServiceError> {
        let mut toasts = self.toasts();
        debug!(message = %config.message, variant = ?config.variant, "Adding toast");
        toasts.push(config);
        TOASTS.publish(&self.bus, &toasts)?;
        Ok(())
    }

    /// Remove the toast at `index`. An out-of-range index republishes the
    /// list unchanged.
    pub fn remove_toast(&self, index: usize) -> Result<(), ServiceError> {
        let mut toasts = self.toasts();
        if index < toasts.len() {
            toasts.remove(index);
        }
        TOASTS.publish(&self.bus, &toasts)?;
        Ok(())
    }

    /// Toasts currently on the bus; empty if none were ever published or
    /// the stored list is unreadable.
    #[must_use]
    pub fn toasts(&self) -> Vec<ToastConfig> {
        TOASTS.last_lenient(&self.bus).unwrap_or_default()
    }
}
