//! Persisted and exchanged JSON shapes.
//!
//! These records mirror the domain types so the storage layer (and the
//! import/export paths in services) can serialize without leaking JSON
//! concerns into `quiz-core`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use quiz_core::model::{
    AnswerKey, OptionLetter, ProgressSnapshot, QuestionId, RestoredProgress, ScoreRecord,
    Scoreboard,
};
use quiz_core::time::from_millis;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

/// Durable-store key for session progress.
pub const PROGRESS_KEY: &str = "qb_state_v1";

/// Durable-store key for the local answer key override.
pub const ANSWER_KEY_KEY: &str = "qb_answer_key_v1";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object at the top level")]
    NotAnObject,

    #[error("invalid question id {0:?}")]
    InvalidId(String),

    #[error("invalid letter {letter:?} for question {id}")]
    InvalidLetter { id: String, letter: String },
}

//
// ─── SCORES ────────────────────────────────────────────────────────────────────
//

/// One score entry: `{correct, selected?, ts}`.
///
/// `correct` is `null` (or missing) for a pending selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    #[serde(default)]
    pub correct: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    #[serde(default)]
    pub ts: Option<Number>,
}

impl ScoreEntry {
    #[must_use]
    pub fn from_record(record: &ScoreRecord) -> Self {
        Self {
            correct: record.correct,
            selected: record.selected.map(|l| l.to_string()),
            ts: Some(Number::from(record.recorded_at.timestamp_millis())),
        }
    }

    fn into_record(self, id: &str) -> Result<ScoreRecord, RecordError> {
        let selected = self
            .selected
            .map(|raw| {
                raw.parse::<OptionLetter>()
                    .map_err(|_| RecordError::InvalidLetter {
                        id: id.to_owned(),
                        letter: raw,
                    })
            })
            .transpose()?;
        Ok(ScoreRecord {
            selected,
            correct: self.correct,
            recorded_at: self.ts.as_ref().map_or(DateTime::UNIX_EPOCH, millis_to_time),
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn millis_to_time(ts: &Number) -> DateTime<Utc> {
    ts.as_i64()
        .or_else(|| ts.as_f64().map(|f| f as i64))
        .and_then(from_millis)
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn parse_id(raw: &str) -> Result<QuestionId, RecordError> {
    raw.parse()
        .map_err(|_| RecordError::InvalidId(raw.to_owned()))
}

/// Scores mapping as persisted and exported (`my-answers.json`).
pub type ScoresRecord = BTreeMap<String, ScoreEntry>;

#[must_use]
pub fn scores_to_record(scores: &Scoreboard) -> ScoresRecord {
    scores
        .iter()
        .map(|(id, record)| (id.to_string(), ScoreEntry::from_record(record)))
        .collect()
}

/// Validate a scores mapping into a domain scoreboard.
///
/// # Errors
///
/// Returns `RecordError` for blank ids or invalid letters.
pub fn scores_from_record(record: ScoresRecord) -> Result<Scoreboard, RecordError> {
    record
        .into_iter()
        .map(|(raw_id, entry)| {
            let id = parse_id(&raw_id)?;
            let score = entry.into_record(&raw_id)?;
            Ok((id, score))
        })
        .collect()
}

/// Parse an answers import file: the top-level value must be an object.
///
/// # Errors
///
/// Returns `RecordError` for malformed JSON, a non-object top level, or invalid entries.
pub fn parse_scores_file(raw: &str) -> Result<Scoreboard, RecordError> {
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(RecordError::NotAnObject);
    }
    let record: ScoresRecord = serde_json::from_value(value)?;
    scores_from_record(record)
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

/// `{idx, order, score}` stored under [`PROGRESS_KEY`].
///
/// Every field is optional on read so older or newer payloads still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(default)]
    pub idx: Option<usize>,
    #[serde(default)]
    pub order: Option<Vec<usize>>,
    #[serde(default)]
    pub score: Option<ScoresRecord>,
}

impl ProgressRecord {
    #[must_use]
    pub fn from_snapshot(snapshot: &ProgressSnapshot) -> Self {
        Self {
            idx: Some(snapshot.position),
            order: Some(snapshot.order.clone()),
            score: Some(scores_to_record(&snapshot.scores)),
        }
    }

    /// Convert the record back into restorable progress.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` if any score entry fails validation.
    pub fn into_restored(self) -> Result<RestoredProgress, RecordError> {
        Ok(RestoredProgress {
            position: self.idx,
            order: self.order,
            scores: scores_from_record(self.score.unwrap_or_default())?,
        })
    }
}

//
// ─── ANSWER KEY ────────────────────────────────────────────────────────────────
//

/// Raw `{"<id>": "<letter>"}` mapping, persisted and exported (`answer_key.json`).
pub type AnswerKeyRecord = BTreeMap<String, String>;

#[must_use]
pub fn answer_key_to_record(key: &AnswerKey) -> AnswerKeyRecord {
    key.iter()
        .map(|(id, letter)| (id.to_string(), letter.to_string()))
        .collect()
}

/// Validate a raw mapping into an answer key.
///
/// # Errors
///
/// Returns `RecordError` for blank ids or invalid letters.
pub fn answer_key_from_record(record: AnswerKeyRecord) -> Result<AnswerKey, RecordError> {
    record
        .into_iter()
        .map(|(raw_id, raw_letter)| {
            let id = parse_id(&raw_id)?;
            let letter = raw_letter
                .parse::<OptionLetter>()
                .map_err(|_| RecordError::InvalidLetter {
                    id: raw_id,
                    letter: raw_letter,
                })?;
            Ok((id, letter))
        })
        .collect()
}

/// Parse an answer key import: either a raw mapping or `{"answer_key": {...}}`.
///
/// The wrapped form wins whenever an `answer_key` object is present.
///
/// # Errors
///
/// Returns `RecordError` for malformed JSON, a non-object top level, or invalid entries.
pub fn parse_answer_key_file(raw: &str) -> Result<AnswerKey, RecordError> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Object(mut object) = value else {
        return Err(RecordError::NotAnObject);
    };
    let mapping = match object.remove("answer_key") {
        Some(Value::Object(inner)) => inner,
        Some(Value::Null) | None => object,
        Some(_) => return Err(RecordError::NotAnObject),
    };
    let record: AnswerKeyRecord = serde_json::from_value(Value::Object(mapping))?;
    answer_key_from_record(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    fn letter(ch: char) -> OptionLetter {
        OptionLetter::new(ch).unwrap()
    }

    #[test]
    fn pending_entries_serialize_correct_as_null() {
        let record = ScoreRecord::pending(letter('C'), fixed_now());
        let json = serde_json::to_value(ScoreEntry::from_record(&record)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"correct": null, "selected": "C", "ts": 1_700_000_000_000_i64})
        );
    }

    #[test]
    fn binary_entries_omit_selected() {
        let record = ScoreRecord::binary(true, fixed_now());
        let json = serde_json::to_value(ScoreEntry::from_record(&record)).unwrap();
        assert!(json.get("selected").is_none());
        assert_eq!(json["correct"], serde_json::json!(true));
    }

    #[test]
    fn progress_record_tolerates_missing_and_unknown_fields() {
        let record: ProgressRecord =
            serde_json::from_str(r#"{"idx": 2, "theme": "dark"}"#).unwrap();
        let restored = record.into_restored().unwrap();
        assert_eq!(restored.position, Some(2));
        assert_eq!(restored.order, None);
        assert!(restored.scores.is_empty());
    }

    #[test]
    fn progress_record_reads_legacy_scores() {
        let raw = r#"{
            "idx": 0,
            "order": [1, 0],
            "score": {
                "1": {"correct": true, "ts": 1700000000000},
                "2": {"correct": false, "selected": "a", "ts": 1700000000000.0},
                "3": {"selected": "D"}
            }
        }"#;
        let record: ProgressRecord = serde_json::from_str(raw).unwrap();
        let restored = record.into_restored().unwrap();
        let two = restored.scores.get(&QuestionId::from(2)).unwrap();
        assert_eq!(two.selected, Some(letter('A')));
        assert_eq!(two.recorded_at, fixed_now());
        let three = restored.scores.get(&QuestionId::from(3)).unwrap();
        assert_eq!(three.correct, None);
        assert_eq!(three.recorded_at, DateTime::UNIX_EPOCH);
        assert_eq!(restored.scores.stats().correct, 1);
    }

    #[test]
    fn invalid_letter_in_scores_is_rejected() {
        let raw = r#"{"1": {"correct": true, "selected": "??"}}"#;
        assert!(matches!(
            parse_scores_file(raw),
            Err(RecordError::InvalidLetter { .. })
        ));
    }

    #[test]
    fn scores_file_must_be_an_object() {
        assert!(matches!(parse_scores_file("[1, 2]"), Err(RecordError::NotAnObject)));
        assert!(matches!(parse_scores_file("null"), Err(RecordError::NotAnObject)));
        assert!(matches!(parse_scores_file("{oops"), Err(RecordError::Json(_))));
    }

    #[test]
    fn answer_key_file_accepts_raw_and_wrapped() {
        let raw = parse_answer_key_file(r#"{"1": "C", "2": "a"}"#).unwrap();
        assert_eq!(raw.get(&QuestionId::from(1)), Some(letter('C')));
        assert_eq!(raw.get(&QuestionId::from(2)), Some(letter('A')));

        let wrapped =
            parse_answer_key_file(r#"{"answer_key": {"7": "B"}, "version": 2}"#).unwrap();
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped.get(&QuestionId::from(7)), Some(letter('B')));
    }

    #[test]
    fn answer_key_file_rejects_bad_shapes() {
        assert!(parse_answer_key_file(r#"["A"]"#).is_err());
        assert!(parse_answer_key_file(r#"{"answer_key": "A"}"#).is_err());
        assert!(parse_answer_key_file(r#"{"1": 3}"#).is_err());
        assert!(parse_answer_key_file(r#"{"1": "AB"}"#).is_err());
    }

    #[test]
    fn answer_key_record_round_trips() {
        let key: AnswerKey = [(QuestionId::from(4), letter('D'))].into_iter().collect();
        let record = answer_key_to_record(&key);
        assert_eq!(record.get("4").map(String::as_str), Some("D"));
        assert_eq!(answer_key_from_record(record).unwrap(), key);
    }
}
