use std::sync::Arc;

use storage::repository::{BankRepository, PageRequest, QuestionPage, QuestionRepository};
use study_core::model::{BankId, Field, Question, QuestionDraft, QuestionId, ValidatedQuestion};

use crate::Clock;
use crate::error::ActionError;

const BANK_MISSING: &str = "bank does not exist";

/// Orchestrates question validation and persistence within a bank.
#[derive(Clone)]
pub struct QuestionService {
    clock: Clock,
    banks: Arc<dyn BankRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl QuestionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        banks: Arc<dyn BankRepository>,
        questions: Arc<dyn QuestionRepository>,
    ) -> Self {
        Self {
            clock,
            banks,
            questions,
        }
    }

    /// Validate and persist a new question.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::Validation` with every failing field, including
    /// `bankId` when the bank does not exist.
    /// Returns `ActionError::System` if persistence fails.
    pub async fn create_question(&self, draft: QuestionDraft) -> Result<Question, ActionError> {
        let validated = self.validate(draft).await?;
        let bank_id = validated.bank_id;

        let question = self
            .questions
            .insert_new_question(validated)
            .await
            .map_err(|e| match e {
                // bank vanished between the check and the insert
                storage::repository::StorageError::NotFound => {
                    ActionError::invalid(Field::BankId, BANK_MISSING)
                }
                other => ActionError::from_storage("question", other),
            })?;
        tracing::info!(%bank_id, question_id = %question.id(), "question created");
        Ok(question)
    }

    /// Replace the text, options and answers of an existing question.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::NotFound` if the question does not exist.
    /// Returns `ActionError::Conflict` if it belongs to a different bank.
    /// Returns `ActionError::Validation` for invalid content.
    pub async fn update_question(
        &self,
        question_id: QuestionId,
        draft: QuestionDraft,
    ) -> Result<Question, ActionError> {
        let existing = self.require_in_bank(question_id, draft.bank_id).await?;
        let validated = self.validate(draft).await?;
        let updated = existing.with_content(validated);

        self.questions
            .update_question(&updated)
            .await
            .map_err(|e| ActionError::from_storage("question", e))?;
        tracing::info!(bank_id = %updated.bank_id(), %question_id, "question updated");
        Ok(updated)
    }

    /// Delete a question, checking it belongs to `bank_id`.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::NotFound` if the question does not exist.
    /// Returns `ActionError::Conflict` if it belongs to a different bank.
    pub async fn delete_question(
        &self,
        question_id: QuestionId,
        bank_id: BankId,
    ) -> Result<(), ActionError> {
        self.require_in_bank(question_id, bank_id).await?;
        self.questions
            .delete_question(question_id)
            .await
            .map_err(|e| ActionError::from_storage("question", e))?;
        tracing::info!(%bank_id, %question_id, "question deleted");
        Ok(())
    }

    /// One page of a bank's questions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::NotFound` if the bank does not exist.
    pub async fn list_questions(
        &self,
        bank_id: BankId,
        page: PageRequest,
    ) -> Result<QuestionPage, ActionError> {
        self.require_bank(bank_id).await?;
        self.questions
            .list_questions(bank_id, page)
            .await
            .map_err(|e| ActionError::from_storage("question", e))
    }

    /// Number of questions in a bank.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::System` if repository access fails.
    pub async fn count_questions(&self, bank_id: BankId) -> Result<u64, ActionError> {
        self.questions
            .count_questions(bank_id)
            .await
            .map_err(|e| ActionError::from_storage("question", e))
    }

    /// Fetch a question by ID, `None` when missing.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::System` if repository access fails.
    pub async fn get_question(
        &self,
        question_id: QuestionId,
    ) -> Result<Option<Question>, ActionError> {
        self.questions
            .get_question(question_id)
            .await
            .map_err(|e| ActionError::from_storage("question", e))
    }

    async fn validate(&self, draft: QuestionDraft) -> Result<ValidatedQuestion, ActionError> {
        let bank_id = draft.bank_id;
        let bank_exists = self
            .banks
            .get_bank(bank_id)
            .await
            .map_err(|e| ActionError::from_storage("bank", e))?
            .is_some();

        let result = match draft.validate(self.clock.now()) {
            Ok(validated) if bank_exists => Ok(validated),
            Ok(_) => Err(ActionError::invalid(Field::BankId, BANK_MISSING)),
            Err(mut errors) => {
                if !bank_exists {
                    errors.push(Field::BankId, BANK_MISSING);
                }
                Err(ActionError::Validation(errors))
            }
        };
        result.inspect_err(|e| tracing::warn!(%bank_id, error = %e, "rejected question"))
    }

    async fn require_bank(&self, bank_id: BankId) -> Result<(), ActionError> {
        let found = self
            .banks
            .get_bank(bank_id)
            .await
            .map_err(|e| ActionError::from_storage("bank", e))?;
        if found.is_none() {
            tracing::warn!(%bank_id, "bank not found");
            return Err(ActionError::NotFound("bank"));
        }
        Ok(())
    }

    async fn require_in_bank(
        &self,
        question_id: QuestionId,
        bank_id: BankId,
    ) -> Result<Question, ActionError> {
        let Some(question) = self.get_question(question_id).await? else {
            tracing::warn!(%question_id, "question not found");
            return Err(ActionError::NotFound("question"));
        };
        if question.bank_id() != bank_id {
            tracing::warn!(%question_id, %bank_id, owner = %question.bank_id(), "bank mismatch");
            return Err(ActionError::Conflict(format!(
                "question {question_id} does not belong to bank {bank_id}"
            )));
        }
        Ok(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use storage::repository::{InMemoryRepository, Storage};
    use study_core::model::BankDraft;
    use study_core::time::fixed_now;

    async fn setup() -> (QuestionService, BankId) {
        let repo = InMemoryRepository::new();
        let bank = repo
            .insert_new_bank(BankDraft::new("Capitals").validate(fixed_now()).unwrap())
            .await
            .unwrap();
        let storage = Storage {
            banks: Arc::new(repo.clone()),
            questions: Arc::new(repo),
        };
        let svc = QuestionService::new(Clock::fixed(fixed_now()), storage.banks, storage.questions);
        (svc, bank.id())
    }

    fn draft(bank_id: BankId) -> QuestionDraft {
        QuestionDraft {
            bank_id,
            question_text: "What is the capital of France?".into(),
            options: vec!["Paris".into(), "Rome".into(), "Madrid".into()],
            correct_indices: vec![0],
        }
    }

    #[tokio::test]
    async fn create_question_persists_answers_from_indices() {
        let (svc, bank_id) = setup().await;
        let mut input = draft(bank_id);
        input.correct_indices = vec![2, 0, 2];
        let q = svc.create_question(input).await.unwrap();
        assert_eq!(q.answers(), ["Paris", "Madrid"]);
        assert_eq!(svc.count_questions(bank_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn create_question_collects_every_field_error() {
        let (svc, _) = setup().await;
        let input = QuestionDraft {
            bank_id: BankId::new(77),
            question_text: "short".into(),
            options: vec!["only".into()],
            correct_indices: vec![],
        };
        let err = svc.create_question(input).await.unwrap_err();
        let fields = err.field_errors().expect("validation");
        for field in [
            Field::BankId,
            Field::QuestionText,
            Field::Options,
            Field::CorrectIndices,
        ] {
            assert!(fields.contains(field), "missing {field}");
        }
    }

    #[tokio::test]
    async fn create_question_for_missing_bank_is_field_error() {
        let (svc, _) = setup().await;
        let err = svc.create_question(draft(BankId::new(9))).await.unwrap_err();
        let fields = err.field_errors().expect("validation");
        assert_eq!(fields.get(Field::BankId), [BANK_MISSING.to_owned()]);
    }

    #[tokio::test]
    async fn out_of_range_index_is_rejected() {
        let (svc, bank_id) = setup().await;
        let mut input = draft(bank_id);
        input.correct_indices = vec![3];
        let err = svc.create_question(input).await.unwrap_err();
        assert!(err.field_errors().unwrap().contains(Field::CorrectIndices));
    }

    #[tokio::test]
    async fn update_question_replaces_content() {
        let (svc, bank_id) = setup().await;
        let q = svc.create_question(draft(bank_id)).await.unwrap();

        let mut edit = draft(bank_id);
        edit.question_text = "Which cities are in Spain?".into();
        edit.options = vec!["Madrid".into(), "Lisbon".into(), "Seville".into()];
        edit.correct_indices = vec![0, 2];
        let updated = svc.update_question(q.id(), edit).await.unwrap();

        assert_eq!(updated.id(), q.id());
        assert_eq!(updated.answers(), ["Madrid", "Seville"]);
        let stored = svc.get_question(q.id()).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn delete_with_wrong_bank_is_conflict() {
        let (svc, bank_id) = setup().await;
        let q = svc.create_question(draft(bank_id)).await.unwrap();

        let err = svc
            .delete_question(q.id(), BankId::new(bank_id.value() + 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Conflict(_)));
        assert!(svc.get_question(q.id()).await.unwrap().is_some());

        svc.delete_question(q.id(), bank_id).await.unwrap();
        assert!(matches!(
            svc.delete_question(q.id(), bank_id).await,
            Err(ActionError::NotFound("question"))
        ));
    }

    #[tokio::test]
    async fn update_with_wrong_bank_is_conflict() {
        let (svc, bank_id) = setup().await;
        let q = svc.create_question(draft(bank_id)).await.unwrap();
        let err = svc
            .update_question(q.id(), draft(BankId::new(bank_id.value() + 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Conflict(_)));
    }

    #[tokio::test]
    async fn list_questions_for_missing_bank_is_not_found() {
        let (svc, _) = setup().await;
        assert!(matches!(
            svc.list_questions(BankId::new(404), PageRequest::default())
                .await,
            Err(ActionError::NotFound("bank"))
        ));
    }
}
