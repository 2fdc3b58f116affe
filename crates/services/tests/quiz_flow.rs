use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{ActionError, ActionResponse, AppServices, Clock, QuizStartError};
use storage::repository::{
    BankRepository, BankSummary, PageRequest, QuestionPage, QuestionRepository, Storage,
    StorageError,
};
use study_core::model::{
    Bank, BankId, Question, QuestionDraft, QuestionId, ValidatedBank, ValidatedQuestion,
};
use study_core::quiz::{AdvanceOutcome, FinishReason, QuizSettings, TickOutcome};
use study_core::time::fixed_now;

async fn seeded_bank(app: &AppServices, n: usize) -> BankId {
    let bank = app.banks().create_bank("Seeded bank").await.unwrap();
    for i in 0..n {
        app.questions()
            .create_question(QuestionDraft {
                bank_id: bank.id(),
                question_text: format!("Seeded question {i:03}"),
                options: vec!["A".into(), "B".into(), "C".into()],
                correct_indices: vec![i % 3],
            })
            .await
            .unwrap();
    }
    bank.id()
}

fn app(settings: QuizSettings) -> AppServices {
    AppServices::in_memory(Clock::fixed(fixed_now()), settings)
}

#[tokio::test]
async fn large_bank_draws_sixty_distinct_questions() {
    let app = app(QuizSettings::default());
    let bank_id = seeded_bank(&app, 80).await;
    let storage_order: Vec<QuestionId> = (1..=60).map(QuestionId::new).collect();

    let mut reordered = 0;
    for seed in 0..5 {
        let mut rng = StdRng::seed_from_u64(seed);
        let started = app
            .quizzes()
            .start_quiz_with_rng(bank_id, &mut rng)
            .await
            .unwrap();
        let ids: Vec<QuestionId> = started.session.questions().iter().map(Question::id).collect();
        assert_eq!(ids.len(), 60);
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 60);
        if ids != storage_order {
            reordered += 1;
        }
    }
    assert_eq!(reordered, 5);
}

#[tokio::test]
async fn timeout_grades_unanswered_as_incorrect() {
    let app = app(QuizSettings::new(60, 3).unwrap());
    let bank_id = seeded_bank(&app, 3).await;
    let mut rng = StdRng::seed_from_u64(2024);
    let mut session = app
        .quizzes()
        .start_quiz_with_rng(bank_id, &mut rng)
        .await
        .unwrap()
        .session;

    for _ in 0..2 {
        let answer = session.current_question().unwrap().answers()[0].clone();
        session.select_option(&answer);
        assert!(matches!(session.advance(), AdvanceOutcome::Next { .. }));
    }
    // picked but never committed
    let answer = session.current_question().unwrap().answers()[0].clone();
    session.select_option(&answer);

    assert_eq!(session.timer_tick(), TickOutcome::Running { remaining: 2 });
    assert_eq!(session.timer_tick(), TickOutcome::Running { remaining: 1 });
    assert_eq!(session.timer_tick(), TickOutcome::TimedOut);
    assert_eq!(session.timer_tick(), TickOutcome::AlreadyFinished);
    assert_eq!(session.finish_reason(), Some(FinishReason::TimedOut));

    let report = session.report().expect("report");
    assert_eq!(report.correct_count, 2);
    assert_eq!(report.total_questions, 3);
    assert_eq!(report.score_percent, 67);
    assert!(!report.passed);
    assert!(!report.verdicts[2].was_answered());
}

#[tokio::test]
async fn retake_builds_a_fresh_session() {
    let app = app(QuizSettings::default());
    let bank_id = seeded_bank(&app, 4).await;
    let quizzes = app.quizzes();

    let mut first = quizzes.start_quiz(bank_id).await.unwrap().session;
    while !first.is_finished() {
        first.select_option_at(0);
        first.advance();
    }
    assert_eq!(first.finish_reason(), Some(FinishReason::Completed));

    let second = quizzes.start_quiz(bank_id).await.unwrap().session;
    assert!(!second.is_finished());
    assert_eq!(second.current_index(), 0);
    assert!(second.user_answers().is_empty());
    assert_eq!(second.questions().len(), 4);
}

#[tokio::test]
async fn deleting_bank_empties_quiz_source() {
    let app = app(QuizSettings::default());
    let bank_id = seeded_bank(&app, 3).await;
    app.banks().delete_bank(bank_id).await.unwrap();

    assert_eq!(app.questions().count_questions(bank_id).await.unwrap(), 0);
    assert!(matches!(
        app.quizzes().start_quiz(bank_id).await,
        Err(QuizStartError::BankNotFound)
    ));
}

struct BrokenStore;

#[async_trait]
impl BankRepository for BrokenStore {
    async fn insert_new_bank(&self, _bank: ValidatedBank) -> Result<Bank, StorageError> {
        Err(StorageError::Connection("database is locked".into()))
    }
    async fn update_bank(&self, _bank: &Bank) -> Result<(), StorageError> {
        Err(StorageError::Connection("database is locked".into()))
    }
    async fn get_bank(&self, _id: BankId) -> Result<Option<Bank>, StorageError> {
        Err(StorageError::Connection("database is locked".into()))
    }
    async fn list_banks(&self) -> Result<Vec<BankSummary>, StorageError> {
        Err(StorageError::Connection("database is locked".into()))
    }
    async fn delete_bank(&self, _id: BankId) -> Result<(), StorageError> {
        Err(StorageError::Connection("database is locked".into()))
    }
}

#[async_trait]
impl QuestionRepository for BrokenStore {
    async fn insert_new_question(
        &self,
        _question: ValidatedQuestion,
    ) -> Result<Question, StorageError> {
        Err(StorageError::Serialization("bad row".into()))
    }
    async fn update_question(&self, _question: &Question) -> Result<(), StorageError> {
        Err(StorageError::Serialization("bad row".into()))
    }
    async fn get_question(&self, _id: QuestionId) -> Result<Option<Question>, StorageError> {
        Err(StorageError::Serialization("bad row".into()))
    }
    async fn delete_question(&self, _id: QuestionId) -> Result<(), StorageError> {
        Err(StorageError::Serialization("bad row".into()))
    }
    async fn list_questions(
        &self,
        _bank_id: BankId,
        _page: PageRequest,
    ) -> Result<QuestionPage, StorageError> {
        Err(StorageError::Serialization("bad row".into()))
    }
    async fn count_questions(&self, _bank_id: BankId) -> Result<u64, StorageError> {
        Err(StorageError::Serialization("bad row".into()))
    }
    async fn all_questions(&self, _bank_id: BankId) -> Result<Vec<Question>, StorageError> {
        Err(StorageError::Serialization("bad row".into()))
    }
}

#[tokio::test]
async fn storage_failures_surface_as_generic_system_errors() {
    let broken = Arc::new(BrokenStore);
    let storage = Storage {
        banks: broken.clone(),
        questions: broken,
    };
    let app = AppServices::from_storage(&storage, Clock::fixed(fixed_now()), QuizSettings::default());

    let err = app.banks().create_bank("Fine title").await.unwrap_err();
    assert!(matches!(err, ActionError::System));

    let resp: ActionResponse<u64> = app.questions().count_questions(BankId::new(1)).await.into();
    assert!(!resp.success);
    assert_eq!(resp.error.as_deref(), Some(services::SYSTEM_ERROR_MESSAGE));
    assert!(!resp.error.unwrap_or_default().contains("bad row"));

    assert!(matches!(
        app.quizzes().start_quiz(BankId::new(1)).await,
        Err(QuizStartError::Action(ActionError::System))
    ));
}
