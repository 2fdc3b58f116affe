use std::sync::Arc;

use rand::Rng;

use storage::repository::{BankRepository, QuestionRepository};
use study_core::model::{Bank, BankId, Question};
use study_core::quiz::{QuizSession, QuizSettings};

use crate::error::{ActionError, QuizStartError};
use crate::pool::select_pool;

/// A freshly built session together with the bank it was drawn from.
#[derive(Debug, Clone)]
pub struct StartedQuiz {
    pub bank: Bank,
    pub session: QuizSession,
}

/// Loads a bank's questions and turns them into a randomized quiz session.
#[derive(Clone)]
pub struct QuizService {
    settings: QuizSettings,
    banks: Arc<dyn BankRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        settings: QuizSettings,
        banks: Arc<dyn BankRepository>,
        questions: Arc<dyn QuestionRepository>,
    ) -> Self {
        Self {
            settings,
            banks,
            questions,
        }
    }

    /// Start a quiz using the thread-local random generator.
    ///
    /// # Errors
    ///
    /// Returns `QuizStartError::BankNotFound` for an unknown bank,
    /// `QuizStartError::EmptyBank` when it has no questions, and
    /// `QuizStartError::Action` if repository access fails.
    pub async fn start_quiz(&self, bank_id: BankId) -> Result<StartedQuiz, QuizStartError> {
        let (bank, questions) = self.load(bank_id).await?;
        let mut rng = rand::rng();
        self.build(bank, &questions, &mut rng)
    }

    /// Start a quiz with a caller-supplied random source.
    ///
    /// # Errors
    ///
    /// Same as [`QuizService::start_quiz`].
    pub async fn start_quiz_with_rng<R: Rng + ?Sized>(
        &self,
        bank_id: BankId,
        rng: &mut R,
    ) -> Result<StartedQuiz, QuizStartError> {
        let (bank, questions) = self.load(bank_id).await?;
        self.build(bank, &questions, rng)
    }

    async fn load(&self, bank_id: BankId) -> Result<(Bank, Vec<Question>), QuizStartError> {
        let bank = self
            .banks
            .get_bank(bank_id)
            .await
            .map_err(|e| ActionError::from_storage("bank", e))?
            .ok_or_else(|| {
                tracing::warn!(%bank_id, "quiz requested for unknown bank");
                QuizStartError::BankNotFound
            })?;

        let questions = self
            .questions
            .all_questions(bank_id)
            .await
            .map_err(|e| ActionError::from_storage("question", e))?;
        if questions.is_empty() {
            tracing::warn!(%bank_id, "quiz requested for empty bank");
            return Err(QuizStartError::EmptyBank);
        }
        Ok((bank, questions))
    }

    fn build<R: Rng + ?Sized>(
        &self,
        bank: Bank,
        questions: &[Question],
        rng: &mut R,
    ) -> Result<StartedQuiz, QuizStartError> {
        let pool = select_pool(questions, self.settings.max_questions(), rng);
        let session = QuizSession::new(pool, &self.settings)?;
        tracing::info!(
            bank_id = %bank.id(),
            available = questions.len(),
            drawn = session.questions().len(),
            time_limit_secs = self.settings.time_limit_secs(),
            "quiz started"
        );
        Ok(StartedQuiz { bank, session })
    }
}
