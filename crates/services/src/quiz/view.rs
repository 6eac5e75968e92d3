use std::collections::BTreeSet;

use url::Url;

use quiz_core::model::{
    AnswerKey, GradeStatus, OptionLetter, QuestionId, QuestionSet, ScoreRecord, ScoreStats,
    SessionState,
};

/// Status badge shown next to the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Unseen,
    Pending,
    MarkedCorrect,
    MarkedIncorrect,
    NoAnswerKey,
}

impl Badge {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Badge::Unseen => "Unseen",
            Badge::Pending => "Pending",
            Badge::MarkedCorrect => "Marked Correct",
            Badge::MarkedIncorrect => "Marked Incorrect",
            Badge::NoAnswerKey => "No Answer Key",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionState {
    Neutral,
    /// Chosen while no key entry exists.
    Selected,
    /// The key letter.
    Correct,
    /// A chosen letter that differs from the key.
    Incorrect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionView {
    pub letter: OptionLetter,
    pub state: OptionState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerPanel {
    pub image: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailView {
    pub label: String,
    pub position: usize,
    pub current: bool,
}

/// Everything needed to draw the current screen. Derived, never mutated back.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizView {
    pub position: usize,
    pub total: usize,
    pub position_label: String,
    pub progress: f64,
    pub question_id: QuestionId,
    pub question_image: String,
    pub question_alt: String,
    pub answer: Option<AnswerPanel>,
    pub badge: Badge,
    pub options: Vec<OptionView>,
    pub stats: ScoreStats,
    pub stats_label: String,
    pub key_setting_mode: bool,
    pub thumbnails: Vec<ThumbnailView>,
}

/// A missing key entry overrides every other badge.
fn badge_for(record: Option<&ScoreRecord>, key: Option<OptionLetter>) -> Badge {
    if key.is_none() {
        return Badge::NoAnswerKey;
    }
    match record.map(ScoreRecord::status) {
        None => Badge::Unseen,
        Some(GradeStatus::Pending) => Badge::Pending,
        Some(GradeStatus::Correct) => Badge::MarkedCorrect,
        Some(GradeStatus::Incorrect) => Badge::MarkedIncorrect,
    }
}

fn option_views(selected: Option<OptionLetter>, key: Option<OptionLetter>) -> Vec<OptionView> {
    let mut letters: BTreeSet<OptionLetter> = OptionLetter::STANDARD.into_iter().collect();
    letters.extend(selected);
    letters.extend(key);

    letters
        .into_iter()
        .map(|letter| {
            let state = match key {
                Some(key) if letter == key => OptionState::Correct,
                Some(_) if selected == Some(letter) => OptionState::Incorrect,
                None if selected == Some(letter) => OptionState::Selected,
                _ => OptionState::Neutral,
            };
            OptionView { letter, state }
        })
        .collect()
}

/// Derive the view for the current position. `None` when nothing is loaded.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn build_view(
    questions: &QuestionSet,
    state: &SessionState,
    answer_key: &AnswerKey,
    key_setting_mode: bool,
    image_base: Option<&Url>,
) -> Option<QuizView> {
    let question = state.current_question(questions)?;
    let total = state.len();
    let position = state.position();
    let record = state.scores().get(question.id());
    let key = answer_key.get(question.id());
    let stats = state.stats();

    let answer = question.answer().map(|image| AnswerPanel {
        image: image.resolve(image_base),
        visible: state.reveal_answer(),
    });

    let thumbnails = (0..total)
        .map(|i| ThumbnailView {
            label: format!("#{}", i + 1),
            position: i,
            current: i == position,
        })
        .collect();

    Some(QuizView {
        position,
        total,
        position_label: format!("{} / {}", position + 1, total),
        progress: (position + 1) as f64 / total as f64,
        question_id: question.id().clone(),
        question_image: question.question().resolve(image_base),
        question_alt: format!("Question {}", question.id()),
        answer,
        badge: badge_for(record, key),
        options: option_views(record.and_then(|r| r.selected), key),
        stats,
        stats_label: format!("Seen {}/{} • Correct {}", stats.seen, questions.len(), stats.correct),
        key_setting_mode,
        thumbnails,
    })
}
