use std::sync::Arc;

use storage::repository::Storage;
use study_core::quiz::QuizSettings;

use crate::Clock;
use crate::bank_service::BankService;
use crate::error::AppServicesError;
use crate::question_service::QuestionService;
use crate::quiz_service::QuizService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    banks: Arc<BankService>,
    questions: Arc<QuestionService>,
    quizzes: Arc<QuizService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: QuizSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        tracing::info!(db_url, "storage ready");
        Ok(Self::from_storage(&storage, clock, settings))
    }

    /// Build services backed by the in-memory repository.
    #[must_use]
    pub fn in_memory(clock: Clock, settings: QuizSettings) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, settings)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, settings: QuizSettings) -> Self {
        let banks = Arc::new(BankService::new(clock, Arc::clone(&storage.banks)));
        let questions = Arc::new(QuestionService::new(
            clock,
            Arc::clone(&storage.banks),
            Arc::clone(&storage.questions),
        ));
        let quizzes = Arc::new(QuizService::new(
            settings,
            Arc::clone(&storage.banks),
            Arc::clone(&storage.questions),
        ));
        Self {
            banks,
            questions,
            quizzes,
        }
    }

    #[must_use]
    pub fn banks(&self) -> Arc<BankService> {
        Arc::clone(&self.banks)
    }

    #[must_use]
    pub fn questions(&self) -> Arc<QuestionService> {
        Arc::clone(&self.questions)
    }

    #[must_use]
    pub fn quizzes(&self) -> Arc<QuizService> {
        Arc::clone(&self.quizzes)
    }
}
