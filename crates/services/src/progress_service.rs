use std::sync::Arc;

use quiz_core::model::{RestoredProgress, SessionState};
use storage::repository::{ProgressRepository, StorageError};

/// Saves and restores session progress.
///
/// Restoring fails soft: anything unreadable counts as "nothing saved".
#[derive(Clone)]
pub struct ProgressService {
    repo: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(repo: Arc<dyn ProgressRepository>) -> Self {
        Self { repo }
    }

    /// Persist position, order and scores, replacing the previous save.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend write fails.
    pub async fn save(&self, state: &SessionState) -> Result<(), StorageError> {
        self.repo.save_progress(&state.snapshot()).await
    }

    /// Read back saved progress. Missing or malformed data yields `None`.
    pub async fn restore(&self) -> Option<RestoredProgress> {
        match self.repo.load_progress().await {
            Ok(restored) => restored,
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable saved progress");
                None
            }
        }
    }
}
