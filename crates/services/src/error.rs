//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use quiz_core::model::{QuestionSetError, SessionStateError};
use storage::records::RecordError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted while loading question or answer key assets.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssetError {
    #[error("invalid asset location: {0}")]
    InvalidLocation(String),
    #[error("asset request to {url} failed with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed asset JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Questions(#[from] QuestionSetError),
    #[error(transparent)]
    AnswerKey(#[from] RecordError),
}

/// Errors emitted by answers / answer key imports.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid import file: {0}")]
    Malformed(#[from] RecordError),
}

/// Errors emitted by the quiz controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error(transparent)]
    Session(#[from] SessionStateError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to serialize export: {0}")]
    Export(#[from] serde_json::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Asset(#[from] AssetError),
}
