mod bank;
mod ids;
mod question;
mod validation;

pub use bank::{BANK_TITLE_MAX_CHARS, Bank, BankDraft, BankError, ValidatedBank};
pub use ids::{BankId, ParseIdError, QuestionId};
pub use question::{
    AnswerMode, MAX_OPTIONS, MIN_OPTIONS, OPTION_MAX_CHARS, OptionMark, QUESTION_TEXT_MAX_CHARS,
    QUESTION_TEXT_MIN_CHARS, Question, QuestionDraft, QuestionError, ValidatedQuestion,
};
pub use validation::{Field, FieldErrors};
