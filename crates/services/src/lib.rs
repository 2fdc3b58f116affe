#![forbid(unsafe_code)]

pub mod app_services;
pub mod bank_service;
pub mod error;
pub mod pool;
pub mod question_service;
pub mod quiz_service;
pub mod response;

pub use study_core::Clock;

pub use app_services::AppServices;
pub use bank_service::BankService;
pub use error::{ActionError, AppServicesError, QuizStartError, SYSTEM_ERROR_MESSAGE};
pub use pool::select_pool;
pub use question_service::QuestionService;
pub use quiz_service::{QuizService, StartedQuiz};
pub use response::ActionResponse;
