use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use url::Url;

use quiz_core::Clock;
use quiz_core::model::{
    AnswerKey, GradeStatus, OptionLetter, Question, QuestionId, QuestionSet, ScoreStats,
    SessionState, SessionStateError,
};
use storage::records::{
    answer_key_to_record, parse_answer_key_file, parse_scores_file, scores_to_record,
};
use storage::repository::Storage;

use crate::answer_key_service::{AnswerKeyOrigin, AnswerKeyService};
use crate::assets::AssetSource;
use crate::error::{ImportError, QuizError};
use crate::grading::{GradingService, SelectionOutcome};
use crate::progress_service::ProgressService;

use super::action::{ActionOutcome, QuizAction};
use super::view::{QuizView, build_view};

/// Owns one viewing session: the question set, session state, answer key and
/// the persistence handles behind them.
///
/// Every handler that changes a persisted field awaits the save before it
/// returns. A failed save is reported after the in-memory change is applied.
pub struct QuizController {
    questions: QuestionSet,
    state: SessionState,
    grading: GradingService,
    progress: ProgressService,
    answer_key: AnswerKeyService,
    answer_key_origin: AnswerKeyOrigin,
    key_setting_mode: bool,
    image_base: Option<Url>,
    rng: StdRng,
}

impl QuizController {
    /// Load questions, restore saved progress and resolve the answer key.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Asset` if the question list cannot be loaded, or
    /// `QuizError::Storage` if an adopted remote answer key cannot be saved.
    pub async fn initialize(
        assets: &dyn AssetSource,
        storage: &Storage,
        clock: Clock,
    ) -> Result<Self, QuizError> {
        let questions = assets.fetch_questions().await?;
        tracing::info!(questions = questions.len(), "loaded question set");

        let progress = ProgressService::new(storage.progress.clone());
        let mut state = SessionState::new(questions.len());
        if let Some(restored) = progress.restore().await {
            let report = state.restore(restored);
            tracing::info!(
                order = report.order_restored,
                position = report.position_restored,
                scores = report.scores_restored,
                "restored saved progress"
            );
        }

        let mut answer_key = AnswerKeyService::new(storage.answer_keys.clone());
        let answer_key_origin = answer_key.load(assets).await?;

        Ok(Self {
            questions,
            state,
            grading: GradingService::new(clock),
            progress,
            answer_key,
            answer_key_origin,
            key_setting_mode: false,
            image_base: assets.image_base(),
            rng: StdRng::from_os_rng(),
        })
    }

    /// Replace the shuffle RNG with a seeded one.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Move by `delta` with wrap-around and persist.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the save fails.
    pub async fn go(&mut self, delta: i64) -> Result<usize, QuizError> {
        let position = self.state.advance(delta)?;
        self.save().await?;
        Ok(position)
    }

    /// Jump to an absolute position and persist.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` for an out-of-range position.
    pub async fn set_index(&mut self, position: usize) -> Result<usize, QuizError> {
        self.state.jump_to(position)?;
        self.save().await?;
        Ok(position)
    }

    /// Reshuffle the display order, return to the first position and persist.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the save fails.
    pub async fn shuffle(&mut self) -> Result<(), QuizError> {
        self.state.shuffle(&mut self.rng)?;
        self.save().await?;
        tracing::debug!(order = ?self.state.order().as_slice(), "shuffled");
        Ok(())
    }

    /// Flip the answer panel. Not persisted.
    pub fn toggle_reveal(&mut self) -> bool {
        let has_answer = self.current_question().is_some_and(Question::has_answer);
        self.state.toggle_reveal(has_answer)
    }

    pub fn toggle_key_setting_mode(&mut self) -> bool {
        self.key_setting_mode = !self.key_setting_mode;
        self.key_setting_mode
    }

    pub fn set_key_setting_mode(&mut self, enabled: bool) {
        self.key_setting_mode = enabled;
    }

    /// Handle an option letter for the current question.
    ///
    /// In key-setting mode the letter becomes the correct answer and scores
    /// are untouched. Otherwise the selection is graded against the key, or
    /// stored as pending when the question has no key entry.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` when no question is loaded and
    /// `QuizError::Storage` if the save fails.
    pub async fn handle_selection(
        &mut self,
        letter: OptionLetter,
    ) -> Result<SelectionOutcome, QuizError> {
        let id = self.current_id()?;

        if self.key_setting_mode {
            self.answer_key.set_correct_letter(id, letter).await?;
            return Ok(SelectionOutcome::KeySet(letter));
        }

        let correct_letter = self.answer_key.correct_letter_for(&id);
        let outcome =
            self.grading
                .grade_selection(self.state.scores_mut(), &id, letter, correct_letter);
        self.save().await?;
        Ok(outcome)
    }

    /// Self-grade the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` when no question is loaded and
    /// `QuizError::Storage` if the save fails.
    pub async fn mark_current(&mut self, correct: bool) -> Result<GradeStatus, QuizError> {
        let id = self.current_id()?;
        self.mark_binary(&id, correct).await
    }

    /// Self-grade the question with `id`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the save fails.
    pub async fn mark_binary(
        &mut self,
        id: &QuestionId,
        correct: bool,
    ) -> Result<GradeStatus, QuizError> {
        let status = self
            .grading
            .mark_binary(self.state.scores_mut(), id, correct);
        self.save().await?;
        Ok(status)
    }

    /// Run one action through the matching handler.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error.
    pub async fn dispatch(&mut self, action: QuizAction) -> Result<ActionOutcome, QuizError> {
        let outcome = match action {
            QuizAction::Go(delta) => ActionOutcome::Moved(self.go(delta).await?),
            QuizAction::SetIndex(position) => ActionOutcome::Moved(self.set_index(position).await?),
            QuizAction::Shuffle => {
                self.shuffle().await?;
                ActionOutcome::Shuffled
            }
            QuizAction::ToggleReveal => ActionOutcome::Revealed(self.toggle_reveal()),
            QuizAction::Select(letter) => {
                ActionOutcome::Selected(self.handle_selection(letter).await?)
            }
            QuizAction::Mark(correct) => ActionOutcome::Marked(self.mark_current(correct).await?),
            QuizAction::ToggleKeySettingMode => {
                ActionOutcome::KeySettingMode(self.toggle_key_setting_mode())
            }
        };
        Ok(outcome)
    }

    //
    // ─── IMPORT / EXPORT ───────────────────────────────────────────────────────
    //

    /// Replace all scores with the contents of an answers file and persist.
    ///
    /// Nothing changes when the file is malformed.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Import` for malformed input and
    /// `QuizError::Storage` if the save fails.
    pub async fn import_answers(&mut self, raw: &str) -> Result<usize, QuizError> {
        let scores = parse_scores_file(raw).map_err(ImportError::from)?;
        let count = scores.len();
        self.state.scores_mut().replace_all(scores);
        self.save().await?;
        tracing::info!(entries = count, "imported answers");
        Ok(count)
    }

    /// Read and import an answers file.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Import` if the file cannot be read or is malformed.
    pub async fn import_answers_file(&mut self, path: &Path) -> Result<usize, QuizError> {
        let raw = read_import(path).await?;
        self.import_answers(&raw).await
    }

    /// Replace the local answer key with a raw or `{"answer_key": ...}` mapping.
    ///
    /// Existing score records are not regraded.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Import` for malformed input and
    /// `QuizError::Storage` if the save fails.
    pub async fn import_answer_key(&mut self, raw: &str) -> Result<usize, QuizError> {
        let key = parse_answer_key_file(raw).map_err(ImportError::from)?;
        let count = key.len();
        self.answer_key.import_bulk(key).await?;
        Ok(count)
    }

    /// Read and import an answer key file.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Import` if the file cannot be read or is malformed.
    pub async fn import_answer_key_file(&mut self, path: &Path) -> Result<usize, QuizError> {
        let raw = read_import(path).await?;
        self.import_answer_key(&raw).await
    }

    /// Pretty-printed scores mapping, re-importable with [`Self::import_answers`].
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Export` if serialization fails.
    pub fn export_answers(&self) -> Result<String, QuizError> {
        Ok(serde_json::to_string_pretty(&scores_to_record(
            self.state.scores(),
        ))?)
    }

    /// Pretty-printed answer key mapping.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Export` if serialization fails.
    pub fn export_answer_key(&self) -> Result<String, QuizError> {
        Ok(serde_json::to_string_pretty(&answer_key_to_record(
            self.answer_key.export_bulk(),
        ))?)
    }

    //
    // ─── READ ACCESS ───────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn view(&self) -> Option<QuizView> {
        build_view(
            &self.questions,
            &self.state,
            self.answer_key.export_bulk(),
            self.key_setting_mode,
            self.image_base.as_ref(),
        )
    }

    #[must_use]
    pub fn stats(&self) -> ScoreStats {
        self.state.stats()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.state.current_question(&self.questions)
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn answer_key(&self) -> &AnswerKey {
        self.answer_key.export_bulk()
    }

    #[must_use]
    pub fn answer_key_origin(&self) -> AnswerKeyOrigin {
        self.answer_key_origin
    }

    /// Flush a final save and release the controller.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the save fails.
    pub async fn teardown(self) -> Result<(), QuizError> {
        self.save().await?;
        tracing::debug!("quiz controller torn down");
        Ok(())
    }

    async fn save(&self) -> Result<(), QuizError> {
        Ok(self.progress.save(&self.state).await?)
    }

    fn current_id(&self) -> Result<QuestionId, QuizError> {
        self.current_question()
            .map(|q| q.id().clone())
            .ok_or(QuizError::Session(SessionStateError::NoQuestions))
    }
}

async fn read_import(path: &Path) -> Result<String, ImportError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })
}
