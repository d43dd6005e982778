use std::sync::Arc;

use quiz_core::model::{LevelId, Question, QuestionBank};
use storage::repository::{Storage, Store};
use storage::sqlite::SqliteStore;
use storage::QuizPersistence;

fn build_bank(level: u32) -> QuestionBank {
    QuestionBank::new(
        LevelId::new(level),
        "Persisted",
        Some("Summary".into()),
        vec![
            Question::new("Q1", vec!["a".into(), "b".into()], 0).unwrap(),
            Question::new("Q2", vec!["c".into(), "d".into(), "e".into()], 2).unwrap(),
        ],
    )
}

#[tokio::test]
async fn sqlite_store_round_trips_and_overwrites() {
    let repo = SqliteStore::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get("missing").await.unwrap(), None);

    repo.set("key", "first").await.unwrap();
    repo.set("key", "second").await.unwrap();
    assert_eq!(repo.get("key").await.unwrap().as_deref(), Some("second"));

    repo.remove("key").await.unwrap();
    assert_eq!(repo.get("key").await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteStore::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.set("kept", "yes").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.get("kept").await.unwrap().as_deref(), Some("yes"));
}

#[tokio::test]
async fn persistence_over_sqlite_keeps_quiz_state() {
    let storage = Storage::sqlite("sqlite:file:memdb_quiz_state?mode=memory&cache=shared")
        .await
        .expect("storage");
    let persistence = QuizPersistence::new(Arc::clone(&storage.store));

    persistence.set_current_level(LevelId::new(3)).await.unwrap();
    persistence.record_progress(LevelId::new(2), 80).await.unwrap();
    persistence.cache_bank(LevelId::new(3), &build_bank(3)).await.unwrap();
    persistence.set_player_name("Sipho").await.unwrap();

    assert_eq!(persistence.current_level().await.unwrap(), LevelId::new(3));
    assert_eq!(
        persistence.progress().await.unwrap().get(LevelId::new(2)),
        Some(80)
    );
    assert_eq!(
        persistence.cached_bank(LevelId::new(3)).await.unwrap(),
        Some(build_bank(3))
    );
    assert_eq!(
        persistence.player_name().await.unwrap().as_deref(),
        Some("Sipho")
    );

    persistence.reset().await.unwrap();
    assert_eq!(persistence.cached_bank(LevelId::new(3)).await.unwrap(), None);
    assert_eq!(persistence.current_level().await.unwrap(), LevelId::FIRST);
}
