use async_trait::async_trait;
use quiz_core::model::{AnswerKey, ProgressSnapshot, RestoredProgress};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::records::{
    ANSWER_KEY_KEY, AnswerKeyRecord, PROGRESS_KEY, ProgressRecord, RecordError,
    answer_key_from_record, answer_key_to_record,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<RecordError> for StorageError {
    fn from(err: RecordError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Durable string key-value store, the local equivalent of browser storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn put_value(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Repository contract for session progress.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Overwrite the saved progress.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_progress(&self, snapshot: &ProgressSnapshot) -> Result<(), StorageError>;

    /// Load saved progress, `None` when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value is malformed,
    /// or other storage errors.
    async fn load_progress(&self) -> Result<Option<RestoredProgress>, StorageError>;
}

/// Repository contract for the local answer key override.
#[async_trait]
pub trait AnswerKeyRepository: Send + Sync {
    /// Overwrite the saved answer key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key cannot be stored.
    async fn save_answer_key(&self, key: &AnswerKey) -> Result<(), StorageError>;

    /// Load the saved answer key, `None` when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value is malformed,
    /// or other storage errors.
    async fn load_answer_key(&self) -> Result<Option<AnswerKey>, StorageError>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> ProgressRepository for T {
    async fn save_progress(&self, snapshot: &ProgressSnapshot) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&ProgressRecord::from_snapshot(snapshot))?;
        self.put_value(PROGRESS_KEY, &payload).await?;
        tracing::debug!(
            position = snapshot.position,
            scores = snapshot.scores.len(),
            "saved progress"
        );
        Ok(())
    }

    async fn load_progress(&self) -> Result<Option<RestoredProgress>, StorageError> {
        let Some(raw) = self.get_value(PROGRESS_KEY).await? else {
            return Ok(None);
        };
        let record: ProgressRecord = serde_json::from_str(&raw)?;
        Ok(Some(record.into_restored()?))
    }
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> AnswerKeyRepository for T {
    async fn save_answer_key(&self, key: &AnswerKey) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&answer_key_to_record(key))?;
        self.put_value(ANSWER_KEY_KEY, &payload).await?;
        tracing::debug!(entries = key.len(), "saved answer key");
        Ok(())
    }

    async fn load_answer_key(&self) -> Result<Option<AnswerKey>, StorageError> {
        let Some(raw) = self.get_value(ANSWER_KEY_KEY).await? else {
            return Ok(None);
        };
        let record: AnswerKeyRecord = serde_json::from_str(&raw)?;
        Ok(Some(answer_key_from_record(record)?))
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put_value(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Aggregates the progress and answer key repositories behind trait objects
/// for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub answer_keys: Arc<dyn AnswerKeyRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(InMemoryRepository::new())
    }

    /// Wrap any key-value backend.
    #[must_use]
    pub fn from_store<S: KeyValueStore + Clone + 'static>(store: S) -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(store.clone());
        let answer_keys: Arc<dyn AnswerKeyRepository> = Arc::new(store);
        Self {
            progress,
            answer_keys,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{OptionLetter, QuestionId, ScoreRecord, Scoreboard};
    use quiz_core::time::fixed_now;

    fn snapshot() -> ProgressSnapshot {
        let mut scores = Scoreboard::new();
        scores.record(
            QuestionId::from(2),
            ScoreRecord::graded(OptionLetter::new('B').unwrap(), true, fixed_now()),
        );
        scores.record(
            QuestionId::from(3),
            ScoreRecord::pending(OptionLetter::new('C').unwrap(), fixed_now()),
        );
        ProgressSnapshot {
            position: 1,
            order: vec![2, 0, 1],
            scores,
        }
    }

    #[tokio::test]
    async fn round_trips_progress() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.load_progress().await.unwrap(), None);

        let saved = snapshot();
        repo.save_progress(&saved).await.unwrap();
        let restored = repo.load_progress().await.unwrap().unwrap();
        assert_eq!(restored, RestoredProgress::from(saved));
    }

    #[tokio::test]
    async fn save_overwrites_previous_progress() {
        let repo = InMemoryRepository::new();
        repo.save_progress(&snapshot()).await.unwrap();
        let second = ProgressSnapshot {
            position: 0,
            order: vec![0, 1, 2],
            scores: Scoreboard::new(),
        };
        repo.save_progress(&second).await.unwrap();
        let restored = repo.load_progress().await.unwrap().unwrap();
        assert_eq!(restored.order, Some(vec![0, 1, 2]));
        assert!(restored.scores.is_empty());
    }

    #[tokio::test]
    async fn malformed_progress_is_a_serialization_error() {
        let repo = InMemoryRepository::new();
        repo.put_value(PROGRESS_KEY, "{not json").await.unwrap();
        assert!(matches!(
            repo.load_progress().await,
            Err(StorageError::Serialization(_))
        ));

        repo.put_value(PROGRESS_KEY, r#"{"idx": "three"}"#).await.unwrap();
        assert!(matches!(
            repo.load_progress().await,
            Err(StorageError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn round_trips_answer_key() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.load_answer_key().await.unwrap(), None);

        let key: AnswerKey = [(QuestionId::from(1), OptionLetter::new('C').unwrap())]
            .into_iter()
            .collect();
        repo.save_answer_key(&key).await.unwrap();
        assert_eq!(
            repo.get_value(ANSWER_KEY_KEY).await.unwrap().as_deref(),
            Some(r#"{"1":"C"}"#)
        );
        assert_eq!(repo.load_answer_key().await.unwrap(), Some(key));
    }

    #[tokio::test]
    async fn storage_shares_one_backend() {
        let repo = InMemoryRepository::new();
        let storage = Storage::from_store(repo.clone());
        storage.progress.save_progress(&snapshot()).await.unwrap();
        assert!(repo.get_value(PROGRESS_KEY).await.unwrap().is_some());
        assert!(storage.answer_keys.load_answer_key().await.unwrap().is_none());
    }
}
