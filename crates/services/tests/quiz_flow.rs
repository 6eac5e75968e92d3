use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::{
    AnswerKey, GradeStatus, ImageRef, OptionLetter, Question, QuestionId, QuestionSet, ScoreStats,
};
use quiz_core::time::fixed_clock;
use services::quiz::{ActionOutcome, Badge, OptionState, QuizAction, action_for_key};
use services::{
    AnswerKeyOrigin, AppServices, AssetError, AssetSource, ImportError, QuizController, QuizError,
    SelectionOutcome,
};
use storage::records::{ANSWER_KEY_KEY, PROGRESS_KEY};
use storage::repository::{InMemoryRepository, KeyValueStore, Storage};
use url::Url;

struct StaticAssets {
    questions: Option<QuestionSet>,
    answer_key: Option<AnswerKey>,
}

#[async_trait]
impl AssetSource for StaticAssets {
    async fn fetch_questions(&self) -> Result<QuestionSet, AssetError> {
        self.questions
            .clone()
            .ok_or_else(|| AssetError::InvalidLocation("no questions".into()))
    }

    async fn fetch_answer_key(&self) -> Result<AnswerKey, AssetError> {
        self.answer_key
            .clone()
            .ok_or_else(|| AssetError::InvalidLocation("no answer key".into()))
    }

    fn image_base(&self) -> Option<Url> {
        None
    }
}

fn letter(ch: char) -> OptionLetter {
    OptionLetter::new(ch).unwrap()
}

fn three_questions() -> QuestionSet {
    let questions = (1..=3u64)
        .map(|id| {
            let answer = (id != 3).then(|| ImageRef::parse(format!("assets/a{id}.png")).unwrap());
            Question::new(
                QuestionId::from(id),
                ImageRef::parse(format!("assets/q{id}.png")).unwrap(),
                answer,
            )
        })
        .collect();
    QuestionSet::non_empty(questions).unwrap()
}

fn assets_without_key() -> StaticAssets {
    StaticAssets {
        questions: Some(three_questions()),
        answer_key: None,
    }
}

async fn controller(repo: &InMemoryRepository, assets: &StaticAssets) -> QuizController {
    QuizController::initialize(assets, &Storage::from_store(repo.clone()), fixed_clock())
        .await
        .unwrap()
        .with_seed(7)
}

#[tokio::test]
async fn pending_selection_is_not_regraded_by_a_later_key() {
    let repo = InMemoryRepository::new();
    let mut quiz = controller(&repo, &assets_without_key()).await;
    assert_eq!(quiz.answer_key_origin(), AnswerKeyOrigin::Unavailable);

    quiz.shuffle().await.unwrap();
    assert_eq!(quiz.state().position(), 0);
    let mut order = quiz.state().order().as_slice().to_vec();
    order.sort_unstable();
    assert_eq!(order, vec![0, 1, 2]);

    // Navigate to question 1 wherever the shuffle put it.
    let target = quiz
        .state()
        .order()
        .as_slice()
        .iter()
        .position(|&i| i == 0)
        .unwrap();
    quiz.set_index(target).await.unwrap();
    let id = QuestionId::from(1);
    assert_eq!(quiz.current_question().unwrap().id(), &id);

    let outcome = quiz.handle_selection(letter('C')).await.unwrap();
    assert_eq!(outcome, SelectionOutcome::Pending(letter('C')));
    let record = quiz.state().scores().get(&id).unwrap();
    assert_eq!(record.selected, Some(letter('C')));
    assert_eq!(record.correct, None);
    assert_eq!(quiz.stats(), ScoreStats { seen: 1, correct: 0 });

    assert_eq!(quiz.import_answer_key(r#"{"1": "C"}"#).await.unwrap(), 1);
    assert_eq!(quiz.stats(), ScoreStats { seen: 1, correct: 0 });
    assert_eq!(quiz.view().unwrap().badge, Badge::Pending);

    let outcome = quiz.handle_selection(letter('C')).await.unwrap();
    assert!(matches!(outcome, SelectionOutcome::Graded { correct: true, .. }));
    assert_eq!(quiz.stats(), ScoreStats { seen: 1, correct: 1 });
    assert_eq!(quiz.view().unwrap().badge, Badge::MarkedCorrect);
}

#[tokio::test]
async fn progress_survives_a_restart() {
    let repo = InMemoryRepository::new();
    let assets = assets_without_key();

    let mut quiz = controller(&repo, &assets).await;
    quiz.shuffle().await.unwrap();
    quiz.go(2).await.unwrap();
    quiz.mark_current(false).await.unwrap();
    quiz.toggle_reveal();
    let order = quiz.state().order().clone();
    let scores = quiz.state().scores().clone();
    quiz.teardown().await.unwrap();

    let restored = controller(&repo, &assets).await;
    assert_eq!(restored.state().position(), 2);
    assert_eq!(restored.state().order(), &order);
    assert_eq!(restored.state().scores(), &scores);
    assert!(!restored.state().reveal_answer());
    assert!(repo.get_value(PROGRESS_KEY).await.unwrap().is_some());
}

#[tokio::test]
async fn navigation_wraps_and_rejects_out_of_range_jumps() {
    let repo = InMemoryRepository::new();
    let mut quiz = controller(&repo, &assets_without_key()).await;

    assert_eq!(quiz.go(-1).await.unwrap(), 2);
    assert_eq!(quiz.go(1).await.unwrap(), 0);
    assert_eq!(quiz.go(7).await.unwrap(), 1);

    let err = quiz.set_index(3).await.unwrap_err();
    assert!(matches!(err, QuizError::Session(_)));
    assert_eq!(quiz.state().position(), 1);
}

#[tokio::test]
async fn reveal_only_toggles_when_an_answer_exists() {
    let repo = InMemoryRepository::new();
    let mut quiz = controller(&repo, &assets_without_key()).await;

    assert!(quiz.toggle_reveal());
    assert!(quiz.view().unwrap().answer.unwrap().visible);
    assert!(!quiz.toggle_reveal());

    quiz.set_index(2).await.unwrap();
    assert_eq!(quiz.current_question().unwrap().id(), &QuestionId::from(3));
    assert!(!quiz.toggle_reveal());
    assert!(quiz.view().unwrap().answer.is_none());
}

#[tokio::test]
async fn key_setting_mode_writes_the_key_without_scoring() {
    let repo = InMemoryRepository::new();
    let mut quiz = controller(&repo, &assets_without_key()).await;

    assert!(quiz.toggle_key_setting_mode());
    let outcome = quiz.handle_selection(letter('b')).await.unwrap();
    assert_eq!(outcome, SelectionOutcome::KeySet(letter('B')));
    assert!(quiz.state().scores().is_empty());
    assert_eq!(quiz.answer_key().get(&QuestionId::from(1)), Some(letter('B')));

    let view = quiz.view().unwrap();
    assert!(view.key_setting_mode);
    assert_eq!(view.badge, Badge::Unseen);
    let b = view.options.iter().find(|o| o.letter == letter('B')).unwrap();
    assert_eq!(b.state, OptionState::Correct);

    quiz.set_key_setting_mode(false);
    let outcome = quiz.handle_selection(letter('A')).await.unwrap();
    assert!(matches!(outcome, SelectionOutcome::Graded { correct: false, .. }));

    let stored = repo.get_value(ANSWER_KEY_KEY).await.unwrap().unwrap();
    assert!(stored.contains("\"B\""));
}

#[tokio::test]
async fn remote_key_is_adopted_once_and_local_edits_win() {
    let repo = InMemoryRepository::new();
    let assets = StaticAssets {
        questions: Some(three_questions()),
        answer_key: Some([(QuestionId::from(1), letter('A'))].into_iter().collect()),
    };

    let mut quiz = controller(&repo, &assets).await;
    assert_eq!(quiz.answer_key_origin(), AnswerKeyOrigin::Remote);
    quiz.set_key_setting_mode(true);
    quiz.handle_selection(letter('D')).await.unwrap();

    let reloaded = controller(&repo, &assets).await;
    assert_eq!(reloaded.answer_key_origin(), AnswerKeyOrigin::Local);
    assert_eq!(reloaded.answer_key().get(&QuestionId::from(1)), Some(letter('D')));
}

#[tokio::test]
async fn malformed_imports_leave_state_unchanged() {
    let repo = InMemoryRepository::new();
    let mut quiz = controller(&repo, &assets_without_key()).await;
    quiz.mark_current(true).await.unwrap();
    let before = quiz.state().scores().clone();

    for raw in ["[1, 2]", "not json", r#"{"1": {"correct": "yes"}}"#, r#"{"1": {"selected": "7"}}"#] {
        let err = quiz.import_answers(raw).await.unwrap_err();
        assert!(matches!(err, QuizError::Import(ImportError::Malformed(_))), "{raw}");
    }
    assert_eq!(quiz.state().scores(), &before);

    let err = quiz.import_answer_key(r#"{"1": "?"}"#).await.unwrap_err();
    assert!(matches!(err, QuizError::Import(_)));
    assert!(quiz.answer_key().is_empty());
}

#[tokio::test]
async fn exports_are_reimportable() {
    let repo = InMemoryRepository::new();
    let mut quiz = controller(&repo, &assets_without_key()).await;
    quiz.import_answer_key(r#"{"answer_key": {"1": "a", "2": "B"}}"#)
        .await
        .unwrap();
    quiz.handle_selection(letter('A')).await.unwrap();
    quiz.go(1).await.unwrap();
    quiz.handle_selection(letter('C')).await.unwrap();

    let answers = quiz.export_answers().unwrap();
    let key = quiz.export_answer_key().unwrap();
    let json: serde_json::Value = serde_json::from_str(&answers).unwrap();
    assert_eq!(json["1"]["correct"], serde_json::Value::Bool(true));
    assert_eq!(json["2"]["selected"], "C");

    let other_repo = InMemoryRepository::new();
    let mut other = controller(&other_repo, &assets_without_key()).await;
    assert_eq!(other.import_answers(&answers).await.unwrap(), 2);
    assert_eq!(other.import_answer_key(&key).await.unwrap(), 2);
    assert_eq!(other.state().scores(), quiz.state().scores());
    assert_eq!(other.answer_key(), quiz.answer_key());
    assert_eq!(other.stats(), ScoreStats { seen: 2, correct: 1 });
}

#[tokio::test]
async fn imports_read_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my-answers.json");
    tokio::fs::write(&path, r#"{"2": {"correct": false, "ts": 1700000000000}}"#)
        .await
        .unwrap();

    let repo = InMemoryRepository::new();
    let mut quiz = controller(&repo, &assets_without_key()).await;
    assert_eq!(quiz.import_answers_file(&path).await.unwrap(), 1);
    assert_eq!(
        quiz.state().scores().get(&QuestionId::from(2)).unwrap().status(),
        GradeStatus::Incorrect
    );

    let missing = dir.path().join("missing.json");
    let err = quiz.import_answer_key_file(&missing).await.unwrap_err();
    assert!(matches!(err, QuizError::Import(ImportError::Io { .. })));
}

#[tokio::test]
async fn keyboard_actions_dispatch_through_the_controller() {
    let repo = InMemoryRepository::new();
    let mut quiz = controller(&repo, &assets_without_key()).await;

    let right = action_for_key("ArrowRight").unwrap();
    assert_eq!(quiz.dispatch(right).await.unwrap(), ActionOutcome::Moved(1));
    let mark = action_for_key("K").unwrap();
    assert_eq!(
        quiz.dispatch(mark).await.unwrap(),
        ActionOutcome::Marked(GradeStatus::Correct)
    );
    assert_eq!(
        quiz.dispatch(QuizAction::ToggleKeySettingMode).await.unwrap(),
        ActionOutcome::KeySettingMode(true)
    );
    assert_eq!(
        quiz.dispatch(QuizAction::Select(letter('C'))).await.unwrap(),
        ActionOutcome::Selected(SelectionOutcome::KeySet(letter('C')))
    );
}

#[tokio::test]
async fn missing_questions_are_fatal() {
    let assets = StaticAssets {
        questions: None,
        answer_key: None,
    };
    let result = QuizController::initialize(&assets, &Storage::in_memory(), fixed_clock()).await;
    assert!(matches!(result, Err(QuizError::Asset(_))));
}

#[tokio::test]
async fn corrupt_saved_progress_starts_fresh() {
    let repo = InMemoryRepository::new();
    repo.put_value(PROGRESS_KEY, "{not json").await.unwrap();
    let quiz = controller(&repo, &assets_without_key()).await;
    assert_eq!(quiz.state().position(), 0);
    assert_eq!(quiz.state().order().as_slice(), &[0, 1, 2]);
    assert!(quiz.state().scores().is_empty());
}

#[tokio::test]
async fn app_services_start_a_quiz() {
    let services = AppServices::new(
        Storage::in_memory(),
        Arc::new(assets_without_key()),
        fixed_clock(),
    );
    let quiz = services.start_quiz().await.unwrap();
    assert_eq!(quiz.questions().len(), 3);
    assert_eq!(quiz.view().unwrap().position_label, "1 / 3");
}
