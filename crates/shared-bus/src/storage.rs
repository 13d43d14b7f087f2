//! # Storage Provider Port
//!
//! Key/value persistence the bus mirrors topic values into.
//!
//! Production: `FileBackedStorage` (JSON object on disk)
//! Testing: `InMemoryStorage` (below)
//!
//! Keys are topic names and values are the text produced by
//! [`codec::encode`](crate::codec::encode).

use crate::error::StorageError;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Abstract interface for the persistence backend.
///
/// Implementations use interior mutability: the bus holds the provider as
/// `Arc<dyn StorageProvider>` and the host usually keeps another handle to it.
pub trait StorageProvider: Send + Sync {
    /// Get a stored value by key.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store a value, replacing any previous one.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Everything currently stored. Read once per `initialize` to seed replay.
    fn get_store(&self) -> Result<BTreeMap<String, String>, StorageError>;

    /// Make buffered writes durable. Called on bus shutdown.
    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

// =============================================================================
// ADAPTER IMPLEMENTATIONS
// =============================================================================

/// In-memory storage provider for tests.
///
/// Records every `set_item` call in order so tests can assert on write-back.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    data: RwLock<BTreeMap<String, String>>,
    writes: RwLock<Vec<(String, String)>>,
}

impl InMemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with entries. Seeding is not recorded as writes.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let data = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            data: RwLock::new(data),
            writes: RwLock::new(Vec::new()),
        }
    }

    /// Every `set_item` call so far, oldest first.
    #[must_use]
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.read().clone()
    }

    /// Number of `set_item` calls for `key`.
    #[must_use]
    pub fn write_count(&self, key: &str) -> usize {
        self.writes.read().iter().filter(|(k, _)| k == key).count()
    }
}

impl StorageProvider for InMemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.data.write().insert(key.to_string(), value.to_string());
        self.writes
            .write()
            .push((key.to_string(), value.to_string()));
        Ok(())
    }

    fn get_store(&self) -> Result<BTreeMap<String, String>, StorageError> {
        Ok(self.data.read().clone())
    }
}

/// File-backed storage provider.
///
/// Keeps the whole store in memory and rewrites the file on every
/// `set_item`, so a value is durable as soon as the call returns. The file is
/// a flat JSON object of string to string.
pub struct FileBackedStorage {
    data: RwLock<BTreeMap<String, String>>,
    path: PathBuf,
}

impl FileBackedStorage {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// - `StorageError::Io` - The file exists but cannot be read
    /// - `StorageError::Corruption` - The file is not a JSON string map
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let data = Self::load_from_file(&path)?;

        if data.is_empty() {
            info!(path = %path.display(), "Storage file empty or not found");
        } else {
            info!(path = %path.display(), keys = data.len(), "Loaded persisted topics");
        }

        Ok(Self {
            data: RwLock::new(data),
            path,
        })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_file(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&text).map_err(|e| StorageError::Corruption {
            message: format!("{}: {}", path.display(), e),
        })
    }

    fn save_to_file(&self, data: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let bytes = serde_json::to_vec_pretty(data).map_err(|e| StorageError::Io {
            message: e.to_string(),
        })?;

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        std::fs::rename(&temp_path, &self.path)?;

        debug!(path = %self.path.display(), keys = data.len(), "Storage file written");
        Ok(())
    }
}

impl StorageProvider for FileBackedStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut data = self.data.write();
        let mut next = data.clone();
        next.insert(key.to_string(), value.to_string());
        self.save_to_file(&next)?;
        *data = next;
        Ok(())
    }

    fn get_store(&self) -> Result<BTreeMap<String, String>, StorageError> {
        Ok(self.data.read().clone())
    }

    fn flush(&self) -> Result<(), StorageError> {
        let data = self.data.read();
        self.save_to_file(&data)
    }
}
