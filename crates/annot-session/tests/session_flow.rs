//! End-to-end session tests over real storage and fetchers

use annot_session::{AnnotationSession, DefaultFetcher, FsFetcher, Requirement, SessionError};
use annot_state::{
    Debouncer, FileStorage, ManualClock, MemoryStorage, StateStorage, StorageError, StorageResult,
    UserState,
};
use annot_test_utils::{
    consented_state, dataset_jsonl, sample_definitions, sample_records, write_questionnaire_dir,
    SAMPLE_POST_IDS,
};
use mockall::mock;
use pretty_assertions::assert_eq;
use serde_json::json;

mock! {
    Storage {}

    impl StateStorage for Storage {
        fn read(&self) -> StorageResult<Option<String>>;
        fn write(&self, blob: &str) -> StorageResult<()>;
        fn remove(&self) -> StorageResult<()>;
    }
}

#[tokio::test]
async fn annotate_export_and_restore() {
    let data = tempfile::tempdir().unwrap();
    let resources = tempfile::tempdir().unwrap();
    write_questionnaire_dir(resources.path());
    std::fs::write(
        resources.path().join("tasks.jsonl"),
        dataset_jsonl(&sample_records()),
    )
    .unwrap();

    let fetcher = DefaultFetcher::new().with_fs_root(resources.path());
    let clock = ManualClock::new(1_700_000_000_000);
    let mut session =
        AnnotationSession::init(FileStorage::new(data.path()), clock.clone(), Debouncer::default());

    let loaded = session.fetch_questionnaires(&fetcher, "").await.unwrap();
    assert_eq!(loaded, 2);
    assert_eq!(session.fetch_dataset(&fetcher, "tasks.jsonl").await.unwrap(), 3);
    assert_eq!(
        session.state().dataset_info.as_ref().unwrap().source,
        "file:tasks.jsonl"
    );

    let err = session.save_current("{}", true).unwrap_err();
    assert!(matches!(err, SessionError::NotReady(_)));

    session.set_annotator_id("annotator1");
    session.set_signed_name("Test Annotator");
    session.set_consent(true);
    let defs = session.questionnaires().to_vec();
    for def in &defs {
        for item in &def.items {
            session.set_answer(&def.key, &item.id, "1");
        }
    }
    assert!(session.readiness().is_ready());

    session.save_current(r#"{"stance": "neutral"}"#, true).unwrap();
    session.set_correct_flag(true).unwrap();
    assert_eq!(session.current_task().unwrap().post_id, SAMPLE_POST_IDS[1]);

    let artifact = session.export_snapshot().unwrap();
    assert_eq!(
        artifact.file_name,
        "annotations_annotator1_2023-11-14T22-13-20-000Z.json"
    );
    session.teardown().unwrap();

    // A new run picks up the persisted state
    let mut reopened =
        AnnotationSession::init(FileStorage::new(data.path()), clock, Debouncer::default());
    assert_eq!(reopened.state().annotator_id, "annotator1");
    assert_eq!(reopened.state().progress_index, 1);
    reopened
        .restore_dataset(&dataset_jsonl(&sample_records()), "file:tasks.jsonl")
        .unwrap();
    assert_eq!(reopened.current_task().unwrap().post_id, "p2");

    let p1 = reopened.state().annotation("p1").unwrap();
    assert_eq!(p1.payload, json!({"stance": "neutral"}));
    assert!(!p1.correct);
    assert!(reopened.state().annotation("p2").unwrap().correct);

    // Clearing purges storage
    reopened.clear().unwrap();
    reopened.teardown().unwrap();
    let fresh = AnnotationSession::init(
        FileStorage::new(data.path()),
        ManualClock::new(0),
        Debouncer::default(),
    );
    assert_eq!(fresh.state(), &UserState::default());

    // Importing the export restores the annotations
    let mut imported = fresh;
    imported.import_snapshot(&artifact.contents).unwrap();
    assert_eq!(imported.state().annotations.len(), 2);
}

#[tokio::test]
async fn missing_questionnaires_leave_gate_closed() {
    let resources = tempfile::tempdir().unwrap();
    let mut session =
        AnnotationSession::init(MemoryStorage::new(), ManualClock::new(0), Debouncer::default());

    let loaded = session
        .fetch_questionnaires(&FsFetcher::new(), resources.path().to_str().unwrap())
        .await
        .unwrap();
    assert_eq!(loaded, 0);
    assert!(session
        .readiness()
        .missing()
        .contains(&Requirement::QuestionnairesLoaded));
}

#[tokio::test]
async fn malformed_questionnaire_fails_load() {
    let resources = tempfile::tempdir().unwrap();
    std::fs::write(resources.path().join("PVQ.json"), "[1, 2, 3]").unwrap();

    let mut session =
        AnnotationSession::init(MemoryStorage::new(), ManualClock::new(0), Debouncer::default());
    let err = session
        .fetch_questionnaires(&FsFetcher::with_root(resources.path()), "")
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Questionnaire(_)));
    assert!(session.questionnaires().is_empty());
}

#[tokio::test]
async fn missing_dataset_is_fetch_error() {
    let mut session =
        AnnotationSession::init(MemoryStorage::new(), ManualClock::new(0), Debouncer::default());
    let err = session
        .fetch_dataset(&FsFetcher::new(), "/definitely/not/here.jsonl")
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Fetch(_)));
}

#[test]
fn burst_of_edits_writes_once() {
    let mut storage = MockStorage::new();
    storage.expect_read().times(1).returning(|| Ok(None));
    storage
        .expect_write()
        .withf(|blob| blob.contains("\"annotatorId\":\"annotator-9\""))
        .times(1)
        .returning(|_| Ok(()));

    let clock = ManualClock::new(0);
    let mut session = AnnotationSession::init(storage, clock.clone(), Debouncer::new(250));
    for n in 0..10 {
        session.set_annotator_id(&format!("annotator-{n}"));
        clock.advance(100);
        assert!(!session.tick().unwrap());
    }

    clock.advance(250);
    assert!(session.tick().unwrap());
    session.teardown().unwrap();
}

#[test]
fn failed_write_is_not_retried() {
    let mut storage = MockStorage::new();
    storage.expect_read().times(1).returning(|| Ok(None));
    storage.expect_write().times(2).returning(|_| {
        Err(StorageError::io_error(
            "/read-only/state.json",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        ))
    });

    let clock = ManualClock::new(0);
    let mut session = AnnotationSession::init(storage, clock.clone(), Debouncer::new(250));
    session.set_annotator_id("annotator-1");

    clock.advance(250);
    assert!(matches!(session.tick(), Err(SessionError::Storage(_))));
    assert_eq!(session.next_write_at(), None);
    for _ in 0..20 {
        clock.advance(250);
        assert!(!session.tick().unwrap());
    }

    // The next edit schedules one fresh attempt
    session.set_annotator_id("annotator-2");
    assert_eq!(session.next_write_at(), Some(5_500));
    clock.advance(250);
    assert!(session.tick().is_err());
    assert_eq!(session.next_write_at(), None);
    session.teardown().unwrap();
}

#[test]
fn hydrates_from_stored_state() {
    let defs = sample_definitions();
    let stored = serde_json::to_string(&consented_state(&defs)).unwrap();

    let mut session = AnnotationSession::init(
        MemoryStorage::with_blob(stored),
        ManualClock::new(0),
        Debouncer::default(),
    );
    session.load_questionnaires(defs);
    assert_eq!(
        session.readiness().missing(),
        &[Requirement::DatasetLoaded]
    );
}

#[test]
fn corrupt_storage_starts_fresh() {
    let session = AnnotationSession::init(
        MemoryStorage::with_blob("{\"annotatorId\": "),
        ManualClock::new(0),
        Debouncer::default(),
    );
    assert_eq!(session.state(), &UserState::default());
}
