use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{BankId, QuestionId};
use crate::model::validation::{Field, FieldErrors};

pub const QUESTION_TEXT_MIN_CHARS: usize = 10;
pub const QUESTION_TEXT_MAX_CHARS: usize = 2000;
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;
pub const OPTION_MAX_CHARS: usize = 500;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Invariant violations found when rehydrating a stored question.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question needs at least {MIN_OPTIONS} options, found {found}")]
    TooFewOptions { found: usize },

    #[error("question has no correct answers")]
    NoAnswers,

    #[error("answer {answer:?} is not one of the options")]
    AnswerNotInOptions { answer: String },
}

//
// ─── ANSWER MODE ───────────────────────────────────────────────────────────────
//

/// How a quiz collects answers for a question.
///
/// Derived from the number of correct answers; there is no stored type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnswerMode {
    /// Exactly one correct answer: a new pick replaces the previous one.
    Single,
    /// Several correct answers: picks toggle independently.
    Multi,
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Form input for creating or updating a question.
///
/// `correct_indices` point into `options`; they are resolved to option text on
/// validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub bank_id: BankId,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_indices: Vec<usize>,
}

impl QuestionDraft {
    /// Check field constraints and resolve correct answers.
    ///
    /// Text and options are trimmed before checking. Every violated field gets
    /// at least one message; bank existence is not checked here.
    ///
    /// # Errors
    ///
    /// Returns the collected `FieldErrors` if any constraint fails.
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidatedQuestion, FieldErrors> {
        let mut errors = FieldErrors::new();

        let question_text = self.question_text.trim().to_owned();
        let text_len = question_text.chars().count();
        if text_len < QUESTION_TEXT_MIN_CHARS {
            errors.push(
                Field::QuestionText,
                format!("must be at least {QUESTION_TEXT_MIN_CHARS} characters"),
            );
        } else if text_len > QUESTION_TEXT_MAX_CHARS {
            errors.push(
                Field::QuestionText,
                format!("must be at most {QUESTION_TEXT_MAX_CHARS} characters"),
            );
        }

        let options: Vec<String> = self.options.iter().map(|o| o.trim().to_owned()).collect();
        if options.len() < MIN_OPTIONS {
            errors.push(
                Field::Options,
                format!("at least {MIN_OPTIONS} options are required"),
            );
        } else if options.len() > MAX_OPTIONS {
            errors.push(
                Field::Options,
                format!("at most {MAX_OPTIONS} options are allowed"),
            );
        }
        let mut seen = HashSet::with_capacity(options.len());
        for (idx, option) in options.iter().enumerate() {
            let label = idx + 1;
            if option.is_empty() {
                errors.push(Field::Options, format!("option {label} cannot be empty"));
            } else if option.chars().count() > OPTION_MAX_CHARS {
                errors.push(
                    Field::Options,
                    format!("option {label} must be at most {OPTION_MAX_CHARS} characters"),
                );
            } else if !seen.insert(option.as_str()) {
                errors.push(Field::Options, format!("option {label} is a duplicate"));
            }
        }

        let mut indices = self.correct_indices;
        indices.sort_unstable();
        indices.dedup();
        if indices.is_empty() {
            errors.push(
                Field::CorrectIndices,
                "at least one correct answer must be selected",
            );
        }
        for idx in &indices {
            if *idx >= options.len() {
                errors.push(
                    Field::CorrectIndices,
                    format!("index {idx} is out of range for {} options", options.len()),
                );
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let answers = indices.iter().map(|idx| options[*idx].clone()).collect();

        Ok(ValidatedQuestion {
            bank_id: self.bank_id,
            question_text,
            options,
            answers,
            created_at: now,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuestion {
    pub bank_id: BankId,
    pub question_text: String,
    pub options: Vec<String>,
    pub answers: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ValidatedQuestion {
    #[must_use]
    pub fn assign_id(self, id: QuestionId) -> Question {
        Question {
            id,
            bank_id: self.bank_id,
            question_text: self.question_text,
            options: self.options,
            answers: self.answers,
            created_at: self.created_at,
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question; `answers` is always a non-empty subset of `options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    id: QuestionId,
    bank_id: BankId,
    question_text: String,
    options: Vec<String>,
    answers: Vec<String>,
    created_at: DateTime<Utc>,
}

/// One option of a question, flagged with whether it is a correct answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionMark {
    pub text: String,
    pub is_correct: bool,
}

fn normalize_for_display(s: &str) -> String {
    s.trim().to_lowercase()
}

impl Question {
    /// Rehydrate a question from storage, re-checking the answer invariant.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the row violates the answers ⊆ options invariant.
    pub fn from_persisted(
        id: QuestionId,
        bank_id: BankId,
        question_text: String,
        options: Vec<String>,
        answers: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, QuestionError> {
        if options.len() < MIN_OPTIONS {
            return Err(QuestionError::TooFewOptions {
                found: options.len(),
            });
        }
        if answers.is_empty() {
            return Err(QuestionError::NoAnswers);
        }
        if let Some(stray) = answers.iter().find(|a| !options.contains(a)) {
            return Err(QuestionError::AnswerNotInOptions {
                answer: stray.clone(),
            });
        }

        Ok(Self {
            id,
            bank_id,
            question_text,
            options,
            answers,
            created_at,
        })
    }

    /// Replace the editable content, keeping id and creation time.
    #[must_use]
    pub fn with_content(&self, validated: ValidatedQuestion) -> Self {
        Self {
            id: self.id,
            bank_id: self.bank_id,
            question_text: validated.question_text,
            options: validated.options,
            answers: validated.answers,
            created_at: self.created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn bank_id(&self) -> BankId {
        self.bank_id
    }

    #[must_use]
    pub fn question_text(&self) -> &str {
        &self.question_text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Correct answers, in option order.
    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn answer_mode(&self) -> AnswerMode {
        if self.answers.len() == 1 {
            AnswerMode::Single
        } else {
            AnswerMode::Multi
        }
    }

    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// Indices of the correct answers within `options`.
    #[must_use]
    pub fn correct_indices(&self) -> Vec<usize> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, o)| self.answers.contains(o))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Display-time check, ignoring surrounding whitespace and case.
    #[must_use]
    pub fn is_correct_option(&self, option: &str) -> bool {
        let needle = normalize_for_display(option);
        self.answers
            .iter()
            .any(|a| normalize_for_display(a) == needle)
    }

    /// Options in order with their correctness, for flashcard-style reveal.
    #[must_use]
    pub fn option_marks(&self) -> Vec<OptionMark> {
        self.options
            .iter()
            .map(|o| OptionMark {
                text: o.clone(),
                is_correct: self.is_correct_option(o),
            })
            .collect()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
