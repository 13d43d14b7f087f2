//! # App Runtime
//!
//! Composition root for the counter application.
//!
//! ```text
//! RuntimeConfig ──→ App::start ──→ MessageBus::initialize(FileBackedStorage)
//!                       │
//!                       ├── configure().exclude(..) for each excluded topic
//!                       └── CounterService / ToastService wired to the bus
//! ```
//!
//! One [`App`] owns exactly one bus. Services receive it as an
//! `Arc<MessageBus>` and never reach for a global.

pub mod config;
pub mod logging;

use anyhow::{Context, Result};
use app_services::{CounterService, Messages, ToastConfig, ToastService, ToastVariant};
use shared_bus::{FileBackedStorage, MessageBus, TopicRegistry};
use std::sync::Arc;
use tracing::{info, warn};

pub use config::RuntimeConfig;

/// Something the user asked the application to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Increment { times: u32 },
    Reset,
    Toast { message: String, variant: ToastVariant },
    Dismiss { index: usize },
    ClearAll,
}

/// What the application currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub count: i64,
    pub toasts: Vec<ToastConfig>,
}

/// A running application instance.
pub struct App {
    bus: Arc<MessageBus>,
    storage: Arc<FileBackedStorage>,
    counter: CounterService,
    toasts: ToastService,
}

impl App {
    /// Open storage, restore persisted topics and wire the services.
    pub fn start(config: &RuntimeConfig) -> Result<Self> {
        let storage = Arc::new(
            FileBackedStorage::open(&config.storage_path).with_context(|| {
                format!("opening storage at {}", config.storage_path.display())
            })?,
        );

        let bus = Arc::new(MessageBus::new());
        bus.initialize(storage.clone())
            .context("restoring persisted topics")?;

        let declared = Messages::registry().context("declaring topics")?;
        apply_exclusions(&bus, &declared, &config.excluded_topics);

        let counter = CounterService::new(bus.clone()).context("starting counter service")?;
        let toasts = ToastService::new(bus.clone());

        info!(
            storage = %storage.path().display(),
            topics = bus.topics().len(),
            "Application started"
        );

        Ok(Self {
            bus,
            storage,
            counter,
            toasts,
        })
    }

    /// Run one command and return the resulting state.
    pub fn execute(&self, command: Command) -> Result<AppState> {
        match command {
            Command::Show => {}
            Command::Increment { times } => {
                for _ in 0..times {
                    self.counter.increment()?;
                }
            }
            Command::Reset => self.counter.reset()?,
            Command::Toast { message, variant } => {
                self.toasts
                    .add_toast(ToastConfig::new(message).with_variant(variant))?;
            }
            Command::Dismiss { index } => self.toasts.remove_toast(index)?,
            Command::ClearAll => self.bus.clear_all()?,
        }
        Ok(self.state())
    }

    #[must_use]
    pub fn state(&self) -> AppState {
        AppState {
            count: self.counter.count(),
            toasts: self.toasts.toasts(),
        }
    }

    #[must_use]
    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<FileBackedStorage> {
        &self.storage
    }

    /// Stop the services and flush storage.
    pub fn shutdown(mut self) -> Result<()> {
        self.counter.destroy();
        self.bus.shutdown().context("flushing storage")?;
        info!("Application stopped");
        Ok(())
    }
}

/// Exclude each topic from persistence, warning about names nothing declares.
pub fn apply_exclusions(bus: &MessageBus, declared: &TopicRegistry, topics: &[String]) {
    for topic in topics {
        if !declared.contains(topic) {
            warn!(topic = %topic, "Excluding a topic that is not declared");
        }
        bus.configure().exclude(topic);
    }
}
