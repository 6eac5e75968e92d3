use quiz_core::Clock;
use quiz_core::model::{GradeStatus, OptionLetter, QuestionId, ScoreRecord, Scoreboard};

/// Result of a single option selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Key-setting mode was on: the letter became the correct answer.
    KeySet(OptionLetter),
    /// No key entry exists; the selection is stored but not graded.
    Pending(OptionLetter),
    /// Graded against the answer key.
    Graded {
        selected: OptionLetter,
        correct_letter: OptionLetter,
        correct: bool,
    },
}

/// Turns selections and manual marks into score records.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradingService {
    clock: Clock,
}

impl GradingService {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self { clock }
    }

    /// Record a multiple-choice selection for `id`.
    ///
    /// Without a key entry the record is `Pending` and does not count towards
    /// the correct total. Existing records are overwritten.
    pub fn grade_selection(
        &self,
        scores: &mut Scoreboard,
        id: &QuestionId,
        selected: OptionLetter,
        correct_letter: Option<OptionLetter>,
    ) -> SelectionOutcome {
        let now = self.clock.now();
        match correct_letter {
            None => {
                scores.record(id.clone(), ScoreRecord::pending(selected, now));
                SelectionOutcome::Pending(selected)
            }
            Some(correct_letter) => {
                let correct = selected == correct_letter;
                scores.record(id.clone(), ScoreRecord::graded(selected, correct, now));
                SelectionOutcome::Graded {
                    selected,
                    correct_letter,
                    correct,
                }
            }
        }
    }

    /// Manual self-grading with no option letter. Overwrites any existing record.
    pub fn mark_binary(&self, scores: &mut Scoreboard, id: &QuestionId, correct: bool) -> GradeStatus {
        let record = ScoreRecord::binary(correct, self.clock.now());
        let status = record.status();
        scores.record(id.clone(), record);
        status
    }
}
