//! Prompts guarding the destructive subcommands.

use std::io::{self, Write};

use study_core::model::{Bank, Question};
use tokio::io::{AsyncBufRead, Lines};

/// Word the user must type, exactly, before a bank is deleted.
pub const BANK_DELETE_WORD: &str = "DELETE";

/// Ask for the typed delete word. Closed stdin counts as a refusal.
///
/// # Errors
///
/// Returns an I/O error if the terminal cannot be read or written.
pub async fn confirm_bank_delete<R, W>(
    bank: &Bank,
    question_count: u64,
    lines: &mut Lines<R>,
    out: &mut W,
) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let noun = if question_count == 1 { "question" } else { "questions" };
    writeln!(
        out,
        "Bank #{} \"{}\" and its {question_count} {noun} will be deleted permanently.",
        bank.id(),
        bank.title()
    )?;
    write!(out, "Type {BANK_DELETE_WORD} to confirm: ")?;
    out.flush()?;
    let answer = lines.next_line().await?;
    Ok(answer.is_some_and(|line| line.trim() == BANK_DELETE_WORD))
}

/// Ask `[y/N]` before deleting one question.
///
/// # Errors
///
/// Returns an I/O error if the terminal cannot be read or written.
pub async fn confirm_question_delete<R, W>(
    question: &Question,
    lines: &mut Lines<R>,
    out: &mut W,
) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(
        out,
        "Delete question #{} \"{}\"? [y/N] ",
        question.id(),
        question.question_text()
    )?;
    out.flush()?;
    let answer = lines.next_line().await?;
    Ok(answer.is_some_and(|line| {
        let line = line.trim();
        line.eq_ignore_ascii_case("y") || line.eq_ignore_ascii_case("yes")
    }))
}
