use chrono::Duration;
use storage::repository::{
    BankRepository, PageRequest, QuestionRepository, Storage, StorageError,
};
use storage::sqlite::SqliteRepository;
use study_core::model::{BankDraft, BankId, QuestionDraft, ValidatedQuestion};
use study_core::time::fixed_now;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn question(bank_id: BankId, text: &str, minutes: i64) -> ValidatedQuestion {
    QuestionDraft {
        bank_id,
        question_text: text.to_owned(),
        options: vec!["Paris".into(), "Rome".into(), "Madrid".into()],
        correct_indices: vec![2, 0],
    }
    .validate(fixed_now() + Duration::minutes(minutes))
    .unwrap()
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_options_and_answers() {
    let repo = connect("memdb_roundtrip").await;
    let bank = repo
        .insert_new_bank(BankDraft::new("Geography").validate(fixed_now()).unwrap())
        .await
        .unwrap();

    let stored = repo
        .insert_new_question(question(bank.id(), "Which are capitals?", 0))
        .await
        .unwrap();

    let fetched = repo.get_question(stored.id()).await.unwrap().expect("row");
    assert_eq!(fetched, stored);
    assert_eq!(fetched.options(), ["Paris", "Rome", "Madrid"]);
    assert_eq!(fetched.answers(), ["Paris", "Madrid"]);
    assert_eq!(fetched.created_at(), fixed_now());

    let fetched_bank = repo.get_bank(bank.id()).await.unwrap().expect("bank");
    assert_eq!(fetched_bank.title(), "Geography");
}

#[tokio::test]
async fn sqlite_delete_bank_cascades() {
    let repo = connect("memdb_cascade").await;
    let bank = repo
        .insert_new_bank(BankDraft::new("Doomed").validate(fixed_now()).unwrap())
        .await
        .unwrap();
    let q = repo
        .insert_new_question(question(bank.id(), "Doomed question text", 0))
        .await
        .unwrap();

    repo.delete_bank(bank.id()).await.unwrap();

    assert!(repo.get_bank(bank.id()).await.unwrap().is_none());
    assert!(repo.get_question(q.id()).await.unwrap().is_none());
    assert!(matches!(
        repo.delete_bank(bank.id()).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_rejects_question_for_missing_bank() {
    let repo = connect("memdb_orphan").await;
    let err = repo
        .insert_new_question(question(BankId::new(404), "Orphaned question", 0))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_lists_pages_and_counts() {
    let repo = connect("memdb_pages").await;
    let bank = repo
        .insert_new_bank(BankDraft::new("Paged").validate(fixed_now()).unwrap())
        .await
        .unwrap();
    let other = repo
        .insert_new_bank(
            BankDraft::new("Other")
                .validate(fixed_now() + Duration::hours(1))
                .unwrap(),
        )
        .await
        .unwrap();
    for i in 0..12 {
        repo.insert_new_question(question(bank.id(), &format!("Paged question {i:02}"), i))
            .await
            .unwrap();
    }

    let page = repo
        .list_questions(bank.id(), PageRequest::new(2, 10))
        .await
        .unwrap();
    assert_eq!(page.total_count, 12);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].question_text(), "Paged question 01");
    assert!(page.has_prev());
    assert!(!page.has_next());

    assert_eq!(repo.count_questions(bank.id()).await.unwrap(), 12);
    assert_eq!(repo.all_questions(bank.id()).await.unwrap().len(), 12);

    let banks = repo.list_banks().await.unwrap();
    assert_eq!(banks.len(), 2);
    assert_eq!(banks[0].bank.id(), other.id());
    assert_eq!(banks[0].question_count, 0);
    assert_eq!(banks[1].question_count, 12);
}

#[tokio::test]
async fn sqlite_updates_bank_and_question() {
    let repo = connect("memdb_updates").await;
    let bank = repo
        .insert_new_bank(BankDraft::new("Old title").validate(fixed_now()).unwrap())
        .await
        .unwrap();
    let renamed = bank.renamed("New title").unwrap();
    repo.update_bank(&renamed).await.unwrap();
    assert_eq!(
        repo.get_bank(bank.id()).await.unwrap().unwrap().title(),
        "New title"
    );

    let stored = repo
        .insert_new_question(question(bank.id(), "Original question", 0))
        .await
        .unwrap();
    let edited = stored.with_content(
        QuestionDraft {
            bank_id: bank.id(),
            question_text: "Edited question text".into(),
            options: vec!["yes".into(), "no".into()],
            correct_indices: vec![1],
        }
        .validate(fixed_now())
        .unwrap(),
    );
    repo.update_question(&edited).await.unwrap();

    let fetched = repo.get_question(stored.id()).await.unwrap().unwrap();
    assert_eq!(fetched.question_text(), "Edited question text");
    assert_eq!(fetched.answers(), ["no"]);

    repo.delete_question(stored.id()).await.unwrap();
    assert!(matches!(
        repo.delete_question(stored.id()).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn storage_facade_builds_from_url() {
    let storage = Storage::sqlite("sqlite:file:memdb_facade?mode=memory&cache=shared")
        .await
        .expect("storage");
    let bank = storage
        .banks
        .insert_new_bank(BankDraft::new("Facade").validate(fixed_now()).unwrap())
        .await
        .unwrap();
    assert_eq!(storage.questions.count_questions(bank.id()).await.unwrap(), 0);
}
