use quiz_core::model::{
    AnswerKey, OptionLetter, ProgressSnapshot, QuestionId, RestoredProgress, ScoreRecord,
    Scoreboard,
};
use quiz_core::time::fixed_now;
use storage::records::PROGRESS_KEY;
use storage::repository::{
    AnswerKeyRepository, KeyValueStore, ProgressRepository, Storage, StorageError,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrip_persists_progress() {
    let repo = connect("memdb_progress").await;

    let mut scores = Scoreboard::new();
    scores.record(
        QuestionId::from(1),
        ScoreRecord::pending(OptionLetter::new('C').unwrap(), fixed_now()),
    );
    scores.record(QuestionId::from(3), ScoreRecord::binary(false, fixed_now()));
    let snapshot = ProgressSnapshot {
        position: 2,
        order: vec![1, 2, 0],
        scores,
    };

    repo.save_progress(&snapshot).await.unwrap();
    let restored = repo.load_progress().await.unwrap().expect("saved progress");
    assert_eq!(restored, RestoredProgress::from(snapshot));
}

#[tokio::test]
async fn sqlite_put_overwrites_and_survives_remigration() {
    let repo = connect("memdb_overwrite").await;

    repo.put_value("k", "one").await.unwrap();
    repo.put_value("k", "two").await.unwrap();
    repo.migrate().await.expect("migrations are idempotent");

    assert_eq!(repo.get_value("k").await.unwrap().as_deref(), Some("two"));
    assert_eq!(repo.get_value("missing").await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_reports_corrupt_progress() {
    let repo = connect("memdb_corrupt").await;
    repo.put_value(PROGRESS_KEY, "][").await.unwrap();
    assert!(matches!(
        repo.load_progress().await,
        Err(StorageError::Serialization(_))
    ));
}

#[tokio::test]
async fn sqlite_storage_persists_answer_key() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("open storage");

    let key: AnswerKey = [
        (QuestionId::from(1), OptionLetter::new('A').unwrap()),
        (QuestionId::from(2), OptionLetter::new('D').unwrap()),
    ]
    .into_iter()
    .collect();
    storage.answer_keys.save_answer_key(&key).await.unwrap();

    let loaded = storage.answer_keys.load_answer_key().await.unwrap();
    assert_eq!(loaded, Some(key));
}
