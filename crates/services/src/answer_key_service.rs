use std::sync::Arc;

use quiz_core::model::{AnswerKey, OptionLetter, QuestionId};
use storage::repository::{AnswerKeyRepository, StorageError};

use crate::assets::AssetSource;

/// Where the active answer key came from after [`AnswerKeyService::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKeyOrigin {
    /// A non-empty local override was already stored.
    Local,
    /// The remote default was adopted and stored as the new local override.
    Remote,
    /// Neither source had entries.
    Unavailable,
}

/// Holds the local answer key override and keeps it persisted.
///
/// The remote default only ever fills an empty local key; once the local key
/// has entries it is never replaced by the remote one.
#[derive(Clone)]
pub struct AnswerKeyService {
    repo: Arc<dyn AnswerKeyRepository>,
    key: AnswerKey,
}

impl AnswerKeyService {
    #[must_use]
    pub fn new(repo: Arc<dyn AnswerKeyRepository>) -> Self {
        Self {
            repo,
            key: AnswerKey::new(),
        }
    }

    /// Load the local override, falling back to the remote default when it is empty.
    ///
    /// A failed or invalid remote fetch is ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if persisting an adopted remote key fails.
    pub async fn load(&mut self, remote: &dyn AssetSource) -> Result<AnswerKeyOrigin, StorageError> {
        self.key = match self.repo.load_answer_key().await {
            Ok(local) => local.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable local answer key");
                AnswerKey::new()
            }
        };

        if !self.key.is_empty() {
            tracing::info!(entries = self.key.len(), "using local answer key");
            return Ok(AnswerKeyOrigin::Local);
        }

        match remote.fetch_answer_key().await {
            Ok(remote_key) if !remote_key.is_empty() => {
                self.key = remote_key;
                self.repo.save_answer_key(&self.key).await?;
                tracing::info!(entries = self.key.len(), "adopted remote answer key");
                Ok(AnswerKeyOrigin::Remote)
            }
            Ok(_) => Ok(AnswerKeyOrigin::Unavailable),
            Err(err) => {
                tracing::info!(error = %err, "no remote answer key");
                Ok(AnswerKeyOrigin::Unavailable)
            }
        }
    }

    /// Upsert one entry and persist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn set_correct_letter(
        &mut self,
        id: QuestionId,
        letter: OptionLetter,
    ) -> Result<(), StorageError> {
        self.key.set(id, letter);
        self.repo.save_answer_key(&self.key).await
    }

    /// Replace the whole key and persist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn import_bulk(&mut self, key: AnswerKey) -> Result<(), StorageError> {
        self.key = key;
        self.repo.save_answer_key(&self.key).await?;
        tracing::info!(entries = self.key.len(), "imported answer key");
        Ok(())
    }

    #[must_use]
    pub fn export_bulk(&self) -> &AnswerKey {
        &self.key
    }

    /// The correct letter for `id`, or `None` when unknown.
    #[must_use]
    pub fn correct_letter_for(&self, id: &QuestionId) -> Option<OptionLetter> {
        self.key.get(id)
    }
}
