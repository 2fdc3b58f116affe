use std::collections::HashSet;

use thiserror::Error;

use crate::model::{AnswerMode, Question, QuestionId};
use crate::quiz::report::{QuizReport, UserAnswers, grade, score_percent};
use crate::quiz::selection::{SelectOutcome, Selection};
use crate::quiz::settings::QuizSettings;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Reasons a session cannot be built from a question pool.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no questions available for a quiz")]
    EmptyPool,

    #[error("quiz pool has {len} questions, maximum is {max}")]
    PoolTooLarge { len: usize, max: usize },

    #[error("question {0} appears more than once in the quiz pool")]
    DuplicateQuestion(QuestionId),
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The last question was answered.
    Completed,
    /// The timer ran out; only committed answers were graded.
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    InProgress,
    Finished(FinishReason),
}

/// Result of `QuizSession::advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Answer committed, now showing the question at `index` (0-based).
    Next { index: usize },
    /// Answer committed on the last question; the report is ready.
    Finished,
    /// Rejected: no option selected for the current question.
    NothingSelected,
    /// Rejected: the session already finished.
    AlreadyFinished,
}

/// Result of `QuizSession::timer_tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running { remaining: u32 },
    TimedOut,
    AlreadyFinished,
}

/// Position data for a progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    /// 1-based number of the question on screen.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    /// `position / total` as a rounded percentage.
    pub percent: u8,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One timed run through a shuffled set of questions.
///
/// The session is driven by three events: option toggles, advance requests
/// and one-second timer ticks. Once finished it is frozen; a retake builds a
/// new session.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<Question>,
    current: usize,
    selection: Selection,
    answers: UserAnswers,
    time_remaining: u32,
    state: SessionState,
    report: Option<QuizReport>,
}

impl QuizSession {
    /// Start a session over an already-selected question list.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyPool` for an empty list,
    /// `QuizError::PoolTooLarge` if it exceeds `settings.max_questions()`,
    /// and `QuizError::DuplicateQuestion` if an id repeats.
    pub fn new(questions: Vec<Question>, settings: &QuizSettings) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::EmptyPool);
        }
        if questions.len() > settings.max_questions() {
            return Err(QuizError::PoolTooLarge {
                len: questions.len(),
                max: settings.max_questions(),
            });
        }
        let mut seen = HashSet::with_capacity(questions.len());
        if let Some(dup) = questions.iter().find(|q| !seen.insert(q.id())) {
            return Err(QuizError::DuplicateQuestion(dup.id()));
        }

        Ok(Self {
            questions,
            current: 0,
            selection: Selection::default(),
            answers: UserAnswers::new(),
            time_remaining: settings.time_limit_secs(),
            state: SessionState::InProgress,
            report: None,
        })
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished(_))
    }

    #[must_use]
    pub fn finish_reason(&self) -> Option<FinishReason> {
        match self.state {
            SessionState::InProgress => None,
            SessionState::Finished(reason) => Some(reason),
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// 0-based index of the question on screen.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question awaiting an answer; `None` once finished.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_finished() {
            return None;
        }
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    #[must_use]
    pub fn selected_options(&self) -> &[String] {
        self.selection.as_slice()
    }

    #[must_use]
    pub fn is_selected(&self, option: &str) -> bool {
        self.selection.contains(option)
    }

    /// Whether `advance` would be accepted right now.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        !self.is_finished() && !self.selection.is_empty()
    }

    #[must_use]
    pub fn user_answers(&self) -> &UserAnswers {
        &self.answers
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// Report computed at the moment the session finished.
    #[must_use]
    pub fn report(&self) -> Option<&QuizReport> {
        self.report.as_ref()
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let total = self.questions.len();
        let position = (self.current + 1).min(total);
        QuizProgress {
            position,
            total,
            answered: self.answers.len(),
            percent: score_percent(position, total),
        }
    }

    /// Toggle `option` for the current question.
    pub fn select_option(&mut self, option: &str) -> SelectOutcome {
        let Some(question) = self.current_question() else {
            return SelectOutcome::Ignored;
        };
        if !question.has_option(option) {
            return SelectOutcome::Ignored;
        }
        let mode: AnswerMode = question.answer_mode();
        self.selection.toggle(mode, option)
    }

    /// Toggle the option at `index` (0-based) of the current question.
    pub fn select_option_at(&mut self, index: usize) -> SelectOutcome {
        let Some(option) = self
            .current_question()
            .and_then(|q| q.options().get(index))
            .cloned()
        else {
            return SelectOutcome::Ignored;
        };
        self.select_option(&option)
    }

    /// Commit the working selection and move on, finishing after the last question.
    pub fn advance(&mut self) -> AdvanceOutcome {
        if self.is_finished() {
            return AdvanceOutcome::AlreadyFinished;
        }
        if self.selection.is_empty() {
            return AdvanceOutcome::NothingSelected;
        }

        let question_id = self.questions[self.current].id();
        self.answers.insert(question_id, self.selection.take());

        if self.is_last_question() {
            self.finish(FinishReason::Completed);
            AdvanceOutcome::Finished
        } else {
            self.current += 1;
            AdvanceOutcome::Next {
                index: self.current,
            }
        }
    }

    /// Count down one second; auto-submits when the budget runs out.
    pub fn timer_tick(&mut self) -> TickOutcome {
        if self.is_finished() {
            return TickOutcome::AlreadyFinished;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            // uncommitted picks are dropped, not graded
            self.selection.take();
            self.finish(FinishReason::TimedOut);
            return TickOutcome::TimedOut;
        }
        TickOutcome::Running {
            remaining: self.time_remaining,
        }
    }

    fn finish(&mut self, reason: FinishReason) {
        if self.is_finished() {
            return;
        }
        self.report = Some(grade(&self.questions, &self.answers));
        self.state = SessionState::Finished(reason);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
