use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::model::{ids::QuestionId, letter::OptionLetter};

//
// ─── SCORE RECORD ──────────────────────────────────────────────────────────────
//

/// Grading state of a question that has a record.
///
/// Questions without a record are "unanswered" and have no status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeStatus {
    /// A selection was made while no answer key entry existed.
    Pending,
    Correct,
    Incorrect,
}

/// Outcome of answering or self-grading one question.
///
/// Records are last-write-wins per question id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    pub selected: Option<OptionLetter>,
    pub correct: Option<bool>,
    pub recorded_at: DateTime<Utc>,
}

impl ScoreRecord {
    /// A multiple-choice selection made without a known correct letter.
    #[must_use]
    pub fn pending(selected: OptionLetter, recorded_at: DateTime<Utc>) -> Self {
        Self {
            selected: Some(selected),
            correct: None,
            recorded_at,
        }
    }

    /// A multiple-choice selection graded against the answer key.
    #[must_use]
    pub fn graded(selected: OptionLetter, correct: bool, recorded_at: DateTime<Utc>) -> Self {
        Self {
            selected: Some(selected),
            correct: Some(correct),
            recorded_at,
        }
    }

    /// A manual correct/incorrect mark with no option letter.
    #[must_use]
    pub fn binary(correct: bool, recorded_at: DateTime<Utc>) -> Self {
        Self {
            selected: None,
            correct: Some(correct),
            recorded_at,
        }
    }

    #[must_use]
    pub fn status(&self) -> GradeStatus {
        match self.correct {
            None => GradeStatus::Pending,
            Some(true) => GradeStatus::Correct,
            Some(false) => GradeStatus::Incorrect,
        }
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.correct == Some(true)
    }
}

//
// ─── SCOREBOARD ────────────────────────────────────────────────────────────────
//

/// Aggregate statistics, always derived from the current scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreStats {
    pub seen: usize,
    pub correct: usize,
}

/// Per-question score records keyed by question id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoreboard(BTreeMap<QuestionId, ScoreRecord>);

impl Scoreboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the record for `id`.
    pub fn record(&mut self, id: QuestionId, record: ScoreRecord) {
        self.0.insert(id, record);
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&ScoreRecord> {
        self.0.get(id)
    }

    /// Replace every record at once (bulk import).
    pub fn replace_all(&mut self, other: Scoreboard) {
        self.0 = other.0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &ScoreRecord)> {
        self.0.iter()
    }

    #[must_use]
    pub fn stats(&self) -> ScoreStats {
        ScoreStats {
            seen: self.0.len(),
            correct: self.0.values().filter(|r| r.is_correct()).count(),
        }
    }
}

impl FromIterator<(QuestionId, ScoreRecord)> for Scoreboard {
    fn from_iter<T: IntoIterator<Item = (QuestionId, ScoreRecord)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
