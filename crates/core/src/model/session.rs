use rand::Rng;
use thiserror::Error;

use crate::model::{
    order::Order,
    question::{Question, QuestionSet},
    score::{ScoreStats, Scoreboard},
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("no questions loaded")]
    NoQuestions,

    #[error("index {index} is out of range for {len} questions")]
    IndexOutOfRange { index: usize, len: usize },
}

//
// ─── PERSISTED SHAPES ──────────────────────────────────────────────────────────
//

/// The persisted part of a session: position, order and scores.
///
/// The reveal flag is transient and never saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub position: usize,
    pub order: Vec<usize>,
    pub scores: Scoreboard,
}

/// Progress read back from storage. Missing fields stay `None` and fall back
/// to freshly-initialized values on restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoredProgress {
    pub position: Option<usize>,
    pub order: Option<Vec<usize>>,
    pub scores: Scoreboard,
}

impl From<ProgressSnapshot> for RestoredProgress {
    fn from(snapshot: ProgressSnapshot) -> Self {
        Self {
            position: Some(snapshot.position),
            order: Some(snapshot.order),
            scores: snapshot.scores,
        }
    }
}

/// What a restore actually applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreReport {
    pub order_restored: bool,
    pub position_restored: bool,
    pub scores_restored: usize,
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// In-memory viewer state: display order, current position, reveal flag and
/// per-question scores. Questions themselves are referenced by index only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    position: usize,
    order: Order,
    reveal_answer: bool,
    scores: Scoreboard,
}

impl SessionState {
    /// Fresh state for `question_count` questions in their natural order.
    #[must_use]
    pub fn new(question_count: usize) -> Self {
        Self {
            position: 0,
            order: Order::identity(question_count),
            reveal_answer: false,
            scores: Scoreboard::new(),
        }
    }

    /// Apply previously saved progress.
    ///
    /// The saved order is only taken when it is a valid permutation for the
    /// current question count, and the saved position only when it is in
    /// range; otherwise the initialized values stay. Scores are always taken.
    pub fn restore(&mut self, restored: RestoredProgress) -> RestoreReport {
        let len = self.order.len();
        let order_restored = match restored.order.map(|o| Order::from_persisted(o, len)) {
            Some(Ok(order)) => {
                self.order = order;
                true
            }
            _ => false,
        };

        let position_restored = match restored.position {
            Some(position) if position < len => {
                self.position = position;
                true
            }
            _ => {
                self.position = 0;
                false
            }
        };

        let scores_restored = restored.scores.len();
        self.scores = restored.scores;
        self.reveal_answer = false;

        RestoreReport {
            order_restored,
            position_restored,
            scores_restored,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn order(&self) -> &Order {
        &self.order
    }

    #[must_use]
    pub fn reveal_answer(&self) -> bool {
        self.reveal_answer
    }

    #[must_use]
    pub fn scores(&self) -> &Scoreboard {
        &self.scores
    }

    pub fn scores_mut(&mut self) -> &mut Scoreboard {
        &mut self.scores
    }

    #[must_use]
    pub fn stats(&self) -> ScoreStats {
        self.scores.stats()
    }

    /// Move by `delta` positions, wrapping in both directions.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::NoQuestions` when the order is empty.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn advance(&mut self, delta: i64) -> Result<usize, SessionStateError> {
        if self.order.is_empty() {
            return Err(SessionStateError::NoQuestions);
        }
        let n = self.order.len() as i64;
        let next = (self.position as i64 + delta.rem_euclid(n)).rem_euclid(n);
        self.position = next as usize;
        self.reveal_answer = false;
        Ok(self.position)
    }

    /// Jump straight to `index` (a position in the display order).
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::IndexOutOfRange` without touching state when
    /// `index` is not a valid position.
    pub fn jump_to(&mut self, index: usize) -> Result<(), SessionStateError> {
        let len = self.order.len();
        if len == 0 {
            return Err(SessionStateError::NoQuestions);
        }
        if index >= len {
            return Err(SessionStateError::IndexOutOfRange { index, len });
        }
        self.position = index;
        self.reveal_answer = false;
        Ok(())
    }

    /// Re-order all questions uniformly at random and go back to the start.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::NoQuestions` when the order is empty.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SessionStateError> {
        if self.order.is_empty() {
            return Err(SessionStateError::NoQuestions);
        }
        self.order.shuffle(rng);
        self.position = 0;
        self.reveal_answer = false;
        Ok(())
    }

    /// Flip the reveal flag. Does nothing when the current question has no
    /// answer image. Returns the new flag.
    pub fn toggle_reveal(&mut self, has_answer: bool) -> bool {
        if has_answer {
            self.reveal_answer = !self.reveal_answer;
        }
        self.reveal_answer
    }

    /// Index into the question set for the current position.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.order.get(self.position)
    }

    #[must_use]
    pub fn current_question<'q>(&self, questions: &'q QuestionSet) -> Option<&'q Question> {
        self.current_index().and_then(|idx| questions.get(idx))
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            position: self.position,
            order: self.order.as_slice().to_vec(),
            scores: self.scores.clone(),
        }
    }
}
