use std::sync::Arc;

use storage::repository::{BankRepository, BankSummary};
use study_core::model::{Bank, BankDraft, BankId};

use crate::Clock;
use crate::error::ActionError;

/// Orchestrates bank creation, renaming and deletion.
#[derive(Clone)]
pub struct BankService {
    clock: Clock,
    banks: Arc<dyn BankRepository>,
}

impl BankService {
    #[must_use]
    pub fn new(clock: Clock, banks: Arc<dyn BankRepository>) -> Self {
        Self { clock, banks }
    }

    /// Create a new bank with the given title.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::Validation` for an empty or overlong title.
    /// Returns `ActionError::System` if persistence fails.
    pub async fn create_bank(&self, title: &str) -> Result<Bank, ActionError> {
        let validated = BankDraft::new(title)
            .validate(self.clock.now())
            .inspect_err(|e| tracing::warn!(error = %e, "rejected bank title"))?;

        let bank = self
            .banks
            .insert_new_bank(validated)
            .await
            .map_err(|e| ActionError::from_storage("bank", e))?;
        tracing::info!(bank_id = %bank.id(), title = bank.title(), "bank created");
        Ok(bank)
    }

    /// Rename an existing bank, keeping its questions and creation time.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::NotFound` if the bank does not exist.
    /// Returns `ActionError::Validation` for an invalid title.
    pub async fn rename_bank(&self, bank_id: BankId, title: &str) -> Result<Bank, ActionError> {
        let bank = self.require_bank(bank_id).await?;
        let renamed = bank
            .renamed(title)
            .inspect_err(|e| tracing::warn!(%bank_id, error = %e, "rejected bank title"))?;

        self.banks
            .update_bank(&renamed)
            .await
            .map_err(|e| ActionError::from_storage("bank", e))?;
        tracing::info!(%bank_id, title = renamed.title(), "bank renamed");
        Ok(renamed)
    }

    /// Delete a bank together with all of its questions.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::NotFound` if the bank does not exist.
    pub async fn delete_bank(&self, bank_id: BankId) -> Result<(), ActionError> {
        self.banks
            .delete_bank(bank_id)
            .await
            .map_err(|e| ActionError::from_storage("bank", e))?;
        tracing::info!(%bank_id, "bank deleted");
        Ok(())
    }

    /// All banks with their question counts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::System` if repository access fails.
    pub async fn list_banks(&self) -> Result<Vec<BankSummary>, ActionError> {
        self.banks
            .list_banks()
            .await
            .map_err(|e| ActionError::from_storage("bank", e))
    }

    /// Fetch a bank by ID.
    ///
    /// Returns `Ok(None)` when the bank does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::System` if repository access fails.
    pub async fn get_bank(&self, bank_id: BankId) -> Result<Option<Bank>, ActionError> {
        self.banks
            .get_bank(bank_id)
            .await
            .map_err(|e| ActionError::from_storage("bank", e))
    }

    async fn require_bank(&self, bank_id: BankId) -> Result<Bank, ActionError> {
        self.get_bank(bank_id).await?.ok_or_else(|| {
            tracing::warn!(%bank_id, "bank not found");
            ActionError::NotFound("bank")
        })
    }
}
