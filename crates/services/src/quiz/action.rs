use quiz_core::model::{GradeStatus, OptionLetter};

use crate::grading::SelectionOutcome;

/// A discrete user event the controller can handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizAction {
    Go(i64),
    SetIndex(usize),
    Shuffle,
    ToggleReveal,
    Select(OptionLetter),
    Mark(bool),
    ToggleKeySettingMode,
}

/// What handling a [`QuizAction`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Moved(usize),
    Shuffled,
    /// New reveal flag; unchanged when the question has no answer image.
    Revealed(bool),
    Selected(SelectionOutcome),
    Marked(GradeStatus),
    KeySettingMode(bool),
}

/// Map a keyboard key name to an action.
///
/// Arrow keys move by one; `s` shuffles, `a` toggles the answer, `k` and `j`
/// mark correct and incorrect. Letter keys are matched case-insensitively.
#[must_use]
pub fn action_for_key(key: &str) -> Option<QuizAction> {
    match key {
        "ArrowLeft" => return Some(QuizAction::Go(-1)),
        "ArrowRight" => return Some(QuizAction::Go(1)),
        _ => {}
    }

    let mut chars = key.chars();
    let (Some(ch), None) = (chars.next(), chars.next()) else {
        return None;
    };
    match ch.to_ascii_lowercase() {
        's' => Some(QuizAction::Shuffle),
        'a' => Some(QuizAction::ToggleReveal),
        'k' => Some(QuizAction::Mark(true)),
        'j' => Some(QuizAction::Mark(false)),
        _ => None,
    }
}
