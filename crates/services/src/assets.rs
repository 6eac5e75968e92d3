//! Loading of the static question and answer key assets.
//!
//! Assets live under `assets/` at either an HTTP base URL or a local
//! directory: `assets/questions.json` (required) and `assets/answer_key.json`
//! (optional).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use quiz_core::Clock;
use quiz_core::model::{AnswerKey, Question, QuestionSet};
use storage::records::{AnswerKeyRecord, answer_key_from_record};

use crate::error::AssetError;

const QUESTIONS_PATH: &str = "assets/questions.json";
const ANSWER_KEY_PATH: &str = "assets/answer_key.json";

#[derive(Debug, Deserialize)]
struct QuestionAsset {
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct AnswerKeyAsset {
    answer_key: AnswerKeyRecord,
}

/// Parse `{"questions": [...]}` into a non-empty question set.
///
/// # Errors
///
/// Returns `AssetError::Parse` for malformed JSON and `AssetError::Questions`
/// for an empty set or duplicate ids.
pub fn parse_question_asset(raw: &str) -> Result<QuestionSet, AssetError> {
    let asset: QuestionAsset = serde_json::from_str(raw)?;
    Ok(QuestionSet::non_empty(asset.questions)?)
}

/// Parse `{"answer_key": {"<id>": "<letter>"}}`.
///
/// # Errors
///
/// Returns `AssetError::Parse` for malformed JSON and `AssetError::AnswerKey`
/// for invalid entries.
pub fn parse_answer_key_asset(raw: &str) -> Result<AnswerKey, AssetError> {
    let asset: AnswerKeyAsset = serde_json::from_str(raw)?;
    Ok(answer_key_from_record(asset.answer_key)?)
}

/// Where the question bank's static assets are served from.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Fetch and validate the question list.
    ///
    /// # Errors
    ///
    /// Returns `AssetError` if the asset cannot be fetched or is invalid.
    async fn fetch_questions(&self) -> Result<QuestionSet, AssetError>;

    /// Fetch the remote default answer key.
    ///
    /// # Errors
    ///
    /// Returns `AssetError` if the asset is missing, unreachable, or invalid.
    async fn fetch_answer_key(&self) -> Result<AnswerKey, AssetError>;

    /// Base that relative image references resolve against, if any.
    fn image_base(&self) -> Option<Url>;
}

/// Parsed `--assets` value: an `http(s)` base URL or a local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    Http(Url),
    Dir(PathBuf),
}

impl AssetLocation {
    /// # Errors
    ///
    /// Returns `AssetError::InvalidLocation` for blank input or an unparsable URL.
    pub fn parse(raw: &str) -> Result<Self, AssetError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AssetError::InvalidLocation(raw.to_owned()));
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            // A trailing slash makes `join` keep the last path segment.
            let with_slash = if raw.ends_with('/') {
                raw.to_owned()
            } else {
                format!("{raw}/")
            };
            let url = Url::parse(&with_slash)
                .map_err(|_| AssetError::InvalidLocation(raw.to_owned()))?;
            return Ok(Self::Http(url));
        }
        Ok(Self::Dir(PathBuf::from(raw)))
    }

    /// Build the matching asset source.
    #[must_use]
    pub fn into_source(self, clock: Clock) -> Box<dyn AssetSource> {
        match self {
            AssetLocation::Http(base) => Box::new(HttpAssetSource::new(base, clock)),
            AssetLocation::Dir(root) => Box::new(DirAssetSource::new(root)),
        }
    }
}

//
// ─── HTTP ──────────────────────────────────────────────────────────────────────
//

#[derive(Clone)]
pub struct HttpAssetSource {
    client: Client,
    base: Url,
    clock: Clock,
}

impl HttpAssetSource {
    #[must_use]
    pub fn new(base: Url, clock: Clock) -> Self {
        Self {
            client: Client::new(),
            base,
            clock,
        }
    }

    fn asset_url(&self, path: &str) -> Result<Url, AssetError> {
        self.base
            .join(path)
            .map_err(|_| AssetError::InvalidLocation(format!("{}{path}", self.base)))
    }

    async fn get_text(&self, url: Url) -> Result<String, AssetError> {
        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(AssetError::HttpStatus {
                url: url.to_string(),
                status: response.status(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl AssetSource for HttpAssetSource {
    async fn fetch_questions(&self) -> Result<QuestionSet, AssetError> {
        let mut url = self.asset_url(QUESTIONS_PATH)?;
        // Cache buster so edits to the question list show up on reload.
        url.query_pairs_mut()
            .append_pair("_", &self.clock.now_millis().to_string());
        let raw = self.get_text(url).await?;
        parse_question_asset(&raw)
    }

    async fn fetch_answer_key(&self) -> Result<AnswerKey, AssetError> {
        let url = self.asset_url(ANSWER_KEY_PATH)?;
        let raw = self.get_text(url).await?;
        parse_answer_key_asset(&raw)
    }

    fn image_base(&self) -> Option<Url> {
        Some(self.base.clone())
    }
}

//
// ─── LOCAL DIRECTORY ───────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn read(&self, relative: &str) -> Result<String, AssetError> {
        let path = self.root.join(relative);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| AssetError::Io { path, source })
    }
}

#[async_trait]
impl AssetSource for DirAssetSource {
    async fn fetch_questions(&self) -> Result<QuestionSet, AssetError> {
        let raw = self.read(QUESTIONS_PATH).await?;
        parse_question_asset(&raw)
    }

    async fn fetch_answer_key(&self) -> Result<AnswerKey, AssetError> {
        let raw = self.read(ANSWER_KEY_PATH).await?;
        parse_answer_key_asset(&raw)
    }

    fn image_base(&self) -> Option<Url> {
        let root = if self.root.is_absolute() {
            self.root.clone()
        } else {
            std::env::current_dir().ok()?.join(&self.root)
        };
        Url::from_directory_path(Path::new(&root)).ok()
    }
}
