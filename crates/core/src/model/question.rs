use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use url::Url;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionSetError {
    #[error("image reference cannot be empty")]
    EmptyImageRef,

    #[error("question set contains no questions")]
    Empty,

    #[error("duplicate question id: {0}")]
    DuplicateId(QuestionId),
}

//
// ─── IMAGE REFERENCES ──────────────────────────────────────────────────────────
//

/// Location of a question or answer image.
///
/// Absolute URLs are kept as-is; anything else is a path relative to the
/// asset root and gets resolved against it when rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Relative(String),
    Url(Url),
}

impl ImageRef {
    /// Parse a raw reference from an asset file.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::EmptyImageRef` for blank input.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, QuestionSetError> {
        let raw = raw.as_ref().trim();
        if raw.is_empty() {
            return Err(QuestionSetError::EmptyImageRef);
        }
        match Url::parse(raw) {
            Ok(url) if !url.cannot_be_a_base() => Ok(ImageRef::Url(url)),
            _ => Ok(ImageRef::Relative(raw.to_owned())),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            ImageRef::Relative(path) => path,
            ImageRef::Url(url) => url.as_str(),
        }
    }

    /// Resolve against an asset base URL; relative refs stay relative without one.
    #[must_use]
    pub fn resolve(&self, base: Option<&Url>) -> String {
        match (self, base) {
            (ImageRef::Url(url), _) => url.to_string(),
            (ImageRef::Relative(path), Some(base)) => base
                .join(path)
                .map_or_else(|_| path.clone(), |joined| joined.to_string()),
            (ImageRef::Relative(path), None) => path.clone(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ImageRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ImageRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ImageRef::parse(raw).map_err(serde::de::Error::custom)
    }
}

// Blank answer refs count as "no answer image".
fn optional_image<'de, D>(deserializer: D) -> Result<Option<ImageRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        Some(s) if !s.trim().is_empty() => ImageRef::parse(s)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single image-based question, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    question: ImageRef,
    #[serde(default, deserialize_with = "optional_image", skip_serializing_if = "Option::is_none")]
    answer: Option<ImageRef>,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, question: ImageRef, answer: Option<ImageRef>) -> Self {
        Self {
            id,
            question,
            answer,
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn question(&self) -> &ImageRef {
        &self.question
    }

    #[must_use]
    pub fn answer(&self) -> Option<&ImageRef> {
        self.answer.as_ref()
    }

    #[must_use]
    pub fn has_answer(&self) -> bool {
        self.answer.is_some()
    }
}

//
// ─── QUESTION SET ──────────────────────────────────────────────────────────────
//

/// The full, ordered list of loaded questions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    /// Build a question set, rejecting duplicate ids.
    ///
    /// An empty list is allowed here; callers that need at least one question
    /// use [`QuestionSet::non_empty`].
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::DuplicateId` if two questions share an id.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionSetError> {
        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(QuestionSetError::DuplicateId(question.id().clone()));
            }
        }
        Ok(Self { questions })
    }

    /// Like [`QuestionSet::new`] but also rejects an empty list.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::Empty` or `QuestionSetError::DuplicateId`.
    pub fn non_empty(questions: Vec<Question>) -> Result<Self, QuestionSetError> {
        if questions.is_empty() {
            return Err(QuestionSetError::Empty);
        }
        Self::new(questions)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}
