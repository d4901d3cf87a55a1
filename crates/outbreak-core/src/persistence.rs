//! Durable progress storage.
//!
//! The session store calls [`ProgressStore::save`] after every transition
//! that changes progress. In-memory state is updated first and stays
//! authoritative; a failed save is logged and otherwise ignored.

use crate::progress::Progress;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors from a progress store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A durable key-value home for one player's progress
pub trait ProgressStore: Send + Sync {
    /// Last saved progress, or `None` if nothing was saved yet
    fn load(&self) -> Result<Option<Progress>, StoreError>;

    /// Persist the full progress snapshot
    fn save(&self, progress: &Progress) -> Result<(), StoreError>;
}

/// Stores progress as pretty-printed JSON in a single file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for JsonFileStore {
    fn load(&self) -> Result<Option<Progress>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&self, progress: &Progress) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Readers never observe a half-written file
        let tmp = self.path.with_extension("json.tmp");
        let mut file = File::create(&tmp)?;
        file.write_all(serde_json::to_string_pretty(progress)?.as_bytes())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Keeps every saved snapshot in memory. Clones share the same history.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    saves: Arc<Mutex<Vec<Progress>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store as if `progress` had been saved earlier
    pub fn with_progress(progress: Progress) -> Self {
        Self {
            saves: Arc::new(Mutex::new(vec![progress])),
        }
    }

    /// Number of saves performed, including any seed
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// The most recent snapshot
    pub fn latest(&self) -> Option<Progress> {
        self.saves.lock().ok().and_then(|s| s.last().cloned())
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> Result<Option<Progress>, StoreError> {
        Ok(self.latest())
    }

    fn save(&self, progress: &Progress) -> Result<(), StoreError> {
        let mut saves = self
            .saves
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        saves.push(progress.clone());
        Ok(())
    }
}
