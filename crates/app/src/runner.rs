//! Interactive terminal quiz driven by stdin lines and a one-second ticker.

use std::io::Write;
use std::time::Duration;

use services::{QuizService, QuizStartError};
use study_core::model::BankId;
use study_core::quiz::{AdvanceOutcome, QuizSession, TickOutcome};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::time::MissedTickBehavior;

use crate::render;

type RunResult<T> = Result<T, Box<dyn std::error::Error>>;

/// What the user asked for after a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    Retake,
    Exit,
}

/// Effect of one line of input on a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEffect {
    Redraw,
    Message(String),
    Finished,
    Quit,
}

/// Apply one trimmed input line: option numbers toggle, empty advances, `q` quits.
pub fn apply_input(session: &mut QuizSession, line: &str) -> InputEffect {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") {
        return InputEffect::Quit;
    }
    if line.is_empty() {
        return match session.advance() {
            AdvanceOutcome::Next { .. } => InputEffect::Redraw,
            AdvanceOutcome::Finished | AdvanceOutcome::AlreadyFinished => InputEffect::Finished,
            AdvanceOutcome::NothingSelected => {
                InputEffect::Message("Select at least one option first.".to_owned())
            }
        };
    }

    // the whole line is checked before any toggle so a typo changes nothing
    let option_count = session.current_question().map_or(0, |q| q.options().len());
    let mut picks = Vec::new();
    for token in line.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()) {
        match token.parse::<usize>() {
            Ok(n) if (1..=option_count).contains(&n) => picks.push(n - 1),
            _ => return InputEffect::Message(format!("No option {token}.")),
        }
    }
    for idx in picks {
        session.select_option_at(idx);
    }
    InputEffect::Redraw
}

/// Run quizzes for `bank_id` until the user exits, retaking on request.
///
/// # Errors
///
/// Returns an error if the quiz cannot be started or the terminal fails.
pub async fn run_quiz<R, W>(
    quizzes: &QuizService,
    bank_id: BankId,
    lines: &mut Lines<R>,
    out: &mut W,
) -> RunResult<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        let started = match quizzes.start_quiz(bank_id).await {
            Ok(started) => started,
            Err(QuizStartError::EmptyBank) => {
                writeln!(
                    out,
                    "This bank has no questions yet. Add some with `add-question` first."
                )?;
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let title = started.bank.title().to_owned();
        let session = drive_session(&title, started.session, lines, out).await?;

        let Some(report) = session.report() else {
            writeln!(out, "Quiz abandoned.")?;
            return Ok(());
        };
        let reason = session
            .finish_reason()
            .unwrap_or(study_core::quiz::FinishReason::Completed);
        tracing::info!(
            %bank_id,
            score = report.score_percent,
            correct = report.correct_count,
            total = report.total_questions,
            passed = report.passed,
            ?reason,
            "quiz finished"
        );
        write!(out, "{}", render::report(report, reason))?;

        if prompt_next(lines, out).await? == NextStep::Exit {
            return Ok(());
        }
    }
}

/// Drive one session until it finishes, the user quits or stdin closes.
async fn drive_session<R, W>(
    bank_title: &str,
    mut session: QuizSession,
    lines: &mut Lines<R>,
    out: &mut W,
) -> RunResult<QuizSession>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick completes immediately
    ticker.tick().await;

    write!(out, "{}", render::question_screen(bank_title, &session))?;
    out.flush()?;

    while !session.is_finished() {
        tokio::select! {
            _ = ticker.tick() => match session.timer_tick() {
                TickOutcome::Running { remaining } if remaining % 60 == 0 || remaining <= 10 => {
                    writeln!(out, "{} left", render::format_clock(remaining))?;
                }
                TickOutcome::Running { .. } | TickOutcome::TimedOut | TickOutcome::AlreadyFinished => {}
            },
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match apply_input(&mut session, &line) {
                    InputEffect::Redraw => {
                        write!(out, "{}", render::question_screen(bank_title, &session))?;
                    }
                    InputEffect::Message(msg) => writeln!(out, "{msg}")?,
                    InputEffect::Finished => {}
                    InputEffect::Quit => break,
                }
            }
        }
        out.flush()?;
    }
    Ok(session)
}

async fn prompt_next<R, W>(lines: &mut Lines<R>, out: &mut W) -> RunResult<NextStep>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "\nr + enter to retake, enter to exit.")?;
    out.flush()?;
    let next = match lines.next_line().await? {
        Some(line) if line.trim().eq_ignore_ascii_case("r") => NextStep::Retake,
        _ => NextStep::Exit,
    };
    Ok(next)
}
