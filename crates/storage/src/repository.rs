use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use study_core::model::{Bank, BankId, Question, QuestionId, ValidatedBank, ValidatedQuestion};
use thiserror::Error;

/// Default number of questions per listing page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on a listing page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── LISTING SHAPES ────────────────────────────────────────────────────────────
//

/// A bank together with how many questions it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankSummary {
    pub bank: Bank,
    pub question_count: u64,
}

/// 1-based page request; out-of-range values are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    #[must_use]
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }
}

/// One page of a bank's questions, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPage {
    pub items: Vec<Question>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
}

impl QuestionPage {
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total_count.div_ceil(u64::from(self.page_size.max(1)))
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }

    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// Repository contract for banks.
#[async_trait]
pub trait BankRepository: Send + Sync {
    /// Insert a new bank and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the bank cannot be stored.
    async fn insert_new_bank(&self, bank: ValidatedBank) -> Result<Bank, StorageError>;

    /// Overwrite an existing bank's title.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the bank does not exist.
    async fn update_bank(&self, bank: &Bank) -> Result<(), StorageError>;

    /// Fetch a bank by ID, `None` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn get_bank(&self, id: BankId) -> Result<Option<Bank>, StorageError>;

    /// All banks with their question counts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn list_banks(&self) -> Result<Vec<BankSummary>, StorageError>;

    /// Delete a bank and every question it owns.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the bank does not exist.
    async fn delete_bank(&self, id: BankId) -> Result<(), StorageError>;
}

/// Repository contract for questions.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Insert a new question and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the owning bank does not exist.
    async fn insert_new_question(&self, question: ValidatedQuestion)
    -> Result<Question, StorageError>;

    /// Overwrite the content of an existing question in the same bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the question does not exist.
    async fn update_question(&self, question: &Question) -> Result<(), StorageError>;

    /// Fetch a question by ID, `None` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError>;

    /// Delete a single question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the question does not exist.
    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError>;

    /// One page of a bank's questions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn list_questions(
        &self,
        bank_id: BankId,
        page: PageRequest,
    ) -> Result<QuestionPage, StorageError>;

    /// Number of questions in a bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn count_questions(&self, bank_id: BankId) -> Result<u64, StorageError>;

    /// Every question of a bank, in storage order (oldest first).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn all_questions(&self, bank_id: BankId) -> Result<Vec<Question>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct MemoryState {
    next_bank_id: u64,
    next_question_id: u64,
    banks: BTreeMap<BankId, Bank>,
    questions: BTreeMap<QuestionId, Question>,
}

impl MemoryState {
    fn bank_questions(&self, bank_id: BankId) -> impl Iterator<Item = &Question> {
        self.questions
            .values()
            .filter(move |q| q.bank_id() == bank_id)
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

fn newest_first(a: &Question, b: &Question) -> std::cmp::Ordering {
    b.created_at()
        .cmp(&a.created_at())
        .then_with(|| b.id().cmp(&a.id()))
}

#[async_trait]
impl BankRepository for InMemoryRepository {
    async fn insert_new_bank(&self, bank: ValidatedBank) -> Result<Bank, StorageError> {
        let mut guard = self.lock()?;
        guard.next_bank_id += 1;
        let bank = bank.assign_id(BankId::new(guard.next_bank_id));
        guard.banks.insert(bank.id(), bank.clone());
        Ok(bank)
    }

    async fn update_bank(&self, bank: &Bank) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let slot = guard.banks.get_mut(&bank.id()).ok_or(StorageError::NotFound)?;
        *slot = bank.clone();
        Ok(())
    }

    async fn get_bank(&self, id: BankId) -> Result<Option<Bank>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.banks.get(&id).cloned())
    }

    async fn list_banks(&self) -> Result<Vec<BankSummary>, StorageError> {
        let guard = self.lock()?;
        let mut out: Vec<BankSummary> = guard
            .banks
            .values()
            .map(|bank| BankSummary {
                bank: bank.clone(),
                question_count: guard.bank_questions(bank.id()).count() as u64,
            })
            .collect();
        out.sort_by(|a, b| {
            b.bank
                .created_at()
                .cmp(&a.bank.created_at())
                .then_with(|| b.bank.id().cmp(&a.bank.id()))
        });
        Ok(out)
    }

    async fn delete_bank(&self, id: BankId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.banks.remove(&id).ok_or(StorageError::NotFound)?;
        guard.questions.retain(|_, q| q.bank_id() != id);
        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn insert_new_question(
        &self,
        question: ValidatedQuestion,
    ) -> Result<Question, StorageError> {
        let mut guard = self.lock()?;
        if !guard.banks.contains_key(&question.bank_id) {
            return Err(StorageError::NotFound);
        }
        guard.next_question_id += 1;
        let question = question.assign_id(QuestionId::new(guard.next_question_id));
        guard.questions.insert(question.id(), question.clone());
        Ok(question)
    }

    async fn update_question(&self, question: &Question) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let slot = guard
            .questions
            .get_mut(&question.id())
            .filter(|q| q.bank_id() == question.bank_id())
            .ok_or(StorageError::NotFound)?;
        *slot = question.clone();
        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.questions.get(&id).cloned())
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard
            .questions
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    async fn list_questions(
        &self,
        bank_id: BankId,
        page: PageRequest,
    ) -> Result<QuestionPage, StorageError> {
        let guard = self.lock()?;
        let mut all: Vec<Question> = guard.bank_questions(bank_id).cloned().collect();
        all.sort_by(newest_first);
        let total_count = all.len() as u64;
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.page_size()).unwrap_or(usize::MAX);
        let items = all.into_iter().skip(skip).take(take).collect();
        Ok(QuestionPage {
            items,
            total_count,
            page: page.page(),
            page_size: page.page_size(),
        })
    }

    async fn count_questions(&self, bank_id: BankId) -> Result<u64, StorageError> {
        let guard = self.lock()?;
        Ok(guard.bank_questions(bank_id).count() as u64)
    }

    async fn all_questions(&self, bank_id: BankId) -> Result<Vec<Question>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.bank_questions(bank_id).cloned().collect())
    }
}

/// Aggregates bank and question repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub banks: Arc<dyn BankRepository>,
    pub questions: Arc<dyn QuestionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let banks: Arc<dyn BankRepository> = Arc::new(repo.clone());
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo);
        Self { banks, questions }
    }
}
