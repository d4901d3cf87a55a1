//! Fire-and-forget progress persistence.
//!
//! Sessions hand snapshots to a [`ChannelStore`], which only enqueues them. A
//! single background task drains the queue and writes each snapshot to the
//! player's JSON file, so writes for one player land in order.

use outbreak_core::{JsonFileStore, Progress, ProgressStore, StoreError};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// A snapshot waiting to be written
#[derive(Debug)]
pub struct SaveRequest {
    pub path: PathBuf,
    pub progress: Progress,
}

/// Progress store whose saves never block the session
#[derive(Debug, Clone)]
pub struct ChannelStore {
    path: PathBuf,
    tx: mpsc::UnboundedSender<SaveRequest>,
}

impl ChannelStore {
    pub fn new(path: PathBuf, tx: mpsc::UnboundedSender<SaveRequest>) -> Self {
        Self { path, tx }
    }
}

impl ProgressStore for ChannelStore {
    fn load(&self) -> Result<Option<Progress>, StoreError> {
        JsonFileStore::new(&self.path).load()
    }

    fn save(&self, progress: &Progress) -> Result<(), StoreError> {
        self.tx
            .send(SaveRequest {
                path: self.path.clone(),
                progress: progress.clone(),
            })
            .map_err(|_| StoreError::Unavailable("progress writer stopped".into()))
    }
}

/// Drain save requests until every sender is dropped
pub async fn run_writer(mut rx: mpsc::UnboundedReceiver<SaveRequest>) {
    while let Some(request) = rx.recv().await {
        let path = request.path.clone();
        let store = JsonFileStore::new(request.path);
        let progress = request.progress;
        match tokio::task::spawn_blocking(move || store.save(&progress)).await {
            Ok(Ok(())) => debug!("Saved progress to {}", path.display()),
            Ok(Err(e)) => warn!("Failed to save progress to {}: {}", path.display(), e),
            Err(e) => error!("Progress writer task failed: {}", e),
        }
    }
}
