//! Quiz session engine: working selection, the session state machine and grading.

mod report;
mod selection;
mod session;
mod settings;

pub use report::{QuestionVerdict, QuizReport, UserAnswers, grade, is_correct, score_percent};
pub use selection::{SelectOutcome, Selection};
pub use session::{
    AdvanceOutcome, FinishReason, QuizError, QuizProgress, QuizSession, SessionState, TickOutcome,
};
pub use settings::{
    DEFAULT_MAX_QUESTIONS, DEFAULT_TIME_LIMIT_SECS, PASS_THRESHOLD_PERCENT, QuizSettings,
    QuizSettingsError,
};
