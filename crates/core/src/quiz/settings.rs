use thiserror::Error;

/// Default number of seconds a quiz may run before it is auto-submitted.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 3600;

/// Default upper bound on questions drawn into one quiz.
pub const DEFAULT_MAX_QUESTIONS: usize = 60;

/// Minimum score (inclusive) for a passing badge.
pub const PASS_THRESHOLD_PERCENT: u8 = 70;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSettingsError {
    #[error("quiz time limit must be > 0 seconds")]
    InvalidTimeLimit,

    #[error("quiz must allow at least one question")]
    InvalidMaxQuestions,
}

/// Knobs for building a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    max_questions: usize,
    time_limit_secs: u32,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            max_questions: DEFAULT_MAX_QUESTIONS,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
        }
    }
}

impl QuizSettings {
    /// # Errors
    ///
    /// Returns `QuizSettingsError` if either limit is zero.
    pub fn new(max_questions: usize, time_limit_secs: u32) -> Result<Self, QuizSettingsError> {
        if max_questions == 0 {
            return Err(QuizSettingsError::InvalidMaxQuestions);
        }
        if time_limit_secs == 0 {
            return Err(QuizSettingsError::InvalidTimeLimit);
        }
        Ok(Self {
            max_questions,
            time_limit_secs,
        })
    }

    #[must_use]
    pub fn max_questions(&self) -> usize {
        self.max_questions
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }
}
