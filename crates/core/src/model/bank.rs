use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::ids::BankId;
use crate::model::validation::{Field, FieldErrors};

/// Maximum length of a bank title, in characters.
pub const BANK_TITLE_MAX_CHARS: usize = 200;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BankError {
    #[error("bank title cannot be empty")]
    EmptyTitle,

    #[error("bank title is {len} characters, maximum is {max}")]
    TitleTooLong { len: usize, max: usize },
}

impl BankError {
    /// Field-level view of this error, keyed on the `title` input.
    #[must_use]
    pub fn field_errors(&self) -> FieldErrors {
        FieldErrors::single(Field::Title, self.to_string())
    }
}

fn normalize_title(title: &str) -> Result<String, BankError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(BankError::EmptyTitle);
    }
    let len = title.chars().count();
    if len > BANK_TITLE_MAX_CHARS {
        return Err(BankError::TitleTooLong {
            len,
            max: BANK_TITLE_MAX_CHARS,
        });
    }
    Ok(title.to_owned())
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// User input for a new bank, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankDraft {
    pub title: String,
}

impl BankDraft {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Validate the draft and stamp its creation time.
    ///
    /// # Errors
    ///
    /// Returns `BankError::EmptyTitle` or `BankError::TitleTooLong`.
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidatedBank, BankError> {
        Ok(ValidatedBank {
            title: normalize_title(&self.title)?,
            created_at: now,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBank {
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl ValidatedBank {
    #[must_use]
    pub fn assign_id(self, id: BankId) -> Bank {
        Bank {
            id,
            title: self.title,
            created_at: self.created_at,
        }
    }
}

//
// ─── BANK ──────────────────────────────────────────────────────────────────────
//

/// A named collection of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    id: BankId,
    title: String,
    created_at: DateTime<Utc>,
}

impl Bank {
    /// Rehydrate a bank from storage.
    ///
    /// # Errors
    ///
    /// Returns `BankError` if the stored title is no longer valid.
    pub fn from_persisted(
        id: BankId,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, BankError> {
        let title = normalize_title(&title.into())?;
        Ok(Self {
            id,
            title,
            created_at,
        })
    }

    /// Returns a copy with a new title, keeping id and creation time.
    ///
    /// # Errors
    ///
    /// Returns `BankError` if the new title is invalid.
    pub fn renamed(&self, title: &str) -> Result<Self, BankError> {
        Ok(Self {
            id: self.id,
            title: normalize_title(title)?,
            created_at: self.created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> BankId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn draft_rejects_blank_title() {
        let err = BankDraft::new("   ").validate(fixed_now()).unwrap_err();
        assert_eq!(err, BankError::EmptyTitle);
        assert_eq!(
            err.field_errors().get(Field::Title),
            ["bank title cannot be empty"]
        );
    }

    #[test]
    fn draft_rejects_long_title() {
        let title = "x".repeat(BANK_TITLE_MAX_CHARS + 1);
        let err = BankDraft::new(title).validate(fixed_now()).unwrap_err();
        assert!(matches!(err, BankError::TitleTooLong { len: 201, max: 200 }));
    }

    #[test]
    fn draft_trims_and_assigns_id() {
        let bank = BankDraft::new("  Docker  ")
            .validate(fixed_now())
            .unwrap()
            .assign_id(BankId::new(3));
        assert_eq!(bank.id(), BankId::new(3));
        assert_eq!(bank.title(), "Docker");
        assert_eq!(bank.created_at(), fixed_now());
    }

    #[test]
    fn renamed_keeps_identity() {
        let bank = Bank::from_persisted(BankId::new(1), "Old", fixed_now()).unwrap();
        let renamed = bank.renamed(" New ").unwrap();
        assert_eq!(renamed.id(), bank.id());
        assert_eq!(renamed.created_at(), bank.created_at());
        assert_eq!(renamed.title(), "New");
        assert_eq!(bank.renamed(""), Err(BankError::EmptyTitle));
    }
}
