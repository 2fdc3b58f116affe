//! Plain-text views for the terminal front-end.

use std::fmt::Write as _;

use storage::repository::{BankSummary, QuestionPage};
use study_core::model::{AnswerMode, Bank, Question};
use study_core::quiz::{FinishReason, QuizReport, QuizSession};

/// `MM:SS`, minutes uncapped.
#[must_use]
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[must_use]
pub fn bank_list(banks: &[BankSummary]) -> String {
    if banks.is_empty() {
        return "No banks yet. Create one with `create-bank <title>`.\n".to_owned();
    }
    let mut out = String::new();
    for summary in banks {
        let count = summary.question_count;
        let noun = if count == 1 { "question" } else { "questions" };
        let _ = writeln!(
            out,
            "{:<6} {}  ({count} {noun}, created {})",
            format!("#{}", summary.bank.id()),
            summary.bank.title(),
            summary.bank.created_at().format("%Y-%m-%d"),
        );
    }
    out
}

/// `Added question #4 to bank #1 (correct: 1, 3)`, numbers 1-based.
#[must_use]
pub fn question_saved(verb: &str, question: &Question) -> String {
    let correct: Vec<String> = question
        .correct_indices()
        .into_iter()
        .map(|idx| (idx + 1).to_string())
        .collect();
    format!(
        "{verb} question #{} in bank #{} (correct: {})",
        question.id(),
        question.bank_id(),
        correct.join(", ")
    )
}

/// Flashcard listing. Correct options are only marked when `reveal` is set.
#[must_use]
pub fn question_page(bank: &Bank, page: &QuestionPage, reveal: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} (page {} of {}, {} questions)",
        bank.title(),
        page.page,
        page.total_pages().max(1),
        page.total_count
    );
    if page.items.is_empty() {
        out.push_str("\nNo questions here. Add one with `add-question`.\n");
        return out;
    }
    for question in &page.items {
        let _ = writeln!(out, "\n[{}] {}", question.id(), question.question_text());
        for (i, mark) in question.option_marks().iter().enumerate() {
            if reveal {
                let tick = if mark.is_correct { "[x]" } else { "[ ]" };
                let _ = writeln!(out, "    {tick} {}. {}", i + 1, mark.text);
            } else {
                let _ = writeln!(out, "    {}. {}", i + 1, mark.text);
            }
        }
    }
    if !reveal {
        out.push_str("
(answers hidden, add --reveal to show them)
");
    }
    let mut nav = Vec::new();
    if page.has_prev() {
        nav.push(format!("--page {} for newer", page.page - 1));
    }
    if page.has_next() {
        nav.push(format!("--page {} for older", page.page + 1));
    }
    if !nav.is_empty() {
        let _ = writeln!(out, "\n({})", nav.join(", "));
    }
    out
}

/// The question on screen with its options, selection state and the clock.
#[must_use]
pub fn question_screen(bank_title: &str, session: &QuizSession) -> String {
    let Some(question) = session.current_question() else {
        return String::new();
    };
    let progress = session.progress();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n{bank_title} | question {} of {} ({}%) | {} left",
        progress.position,
        progress.total,
        progress.percent,
        format_clock(session.time_remaining())
    );
    let _ = writeln!(out, "{}", question.question_text());
    let (open, close, hint) = match question.answer_mode() {
        AnswerMode::Single => ('(', ')', "select 1 option".to_owned()),
        AnswerMode::Multi => ('[', ']', format!("select {} options", question.answers().len())),
    };
    let _ = writeln!(out, "({hint})");
    for (i, option) in question.options().iter().enumerate() {
        let mark = if session.is_selected(option) { '*' } else { ' ' };
        let _ = writeln!(out, "  {open}{mark}{close} {}. {option}", i + 1);
    }
    let action = if session.is_last_question() { "finish" } else { "next" };
    let _ = writeln!(
        out,
        "Type option numbers to toggle, empty line for {action}, q to quit."
    );
    out
}

#[must_use]
pub fn report(report: &QuizReport, reason: FinishReason) -> String {
    let mut out = String::new();
    if reason == FinishReason::TimedOut {
        out.push_str("\nTime's up! Unanswered questions count as incorrect.\n");
    }
    let badge = if report.passed { "PASS" } else { "FAIL" };
    let _ = writeln!(
        out,
        "\nScore: {}% ({}/{} correct) {badge}",
        report.score_percent, report.correct_count, report.total_questions
    );
    for verdict in &report.verdicts {
        let sign = if verdict.is_correct { "ok " } else { "MISS" };
        let _ = writeln!(out, "\n{sign} {}. {}", verdict.index, verdict.question_text);
        if verdict.is_correct {
            continue;
        }
        if verdict.was_answered() {
            let picks: Vec<String> = verdict
                .marked_selections()
                .map(|(text, right)| {
                    if right {
                        text.to_owned()
                    } else {
                        format!("{text} (wrong)")
                    }
                })
                .collect();
            let _ = writeln!(out, "     your answer: {}", picks.join(", "));
        } else {
            out.push_str("     your answer: (none)\n");
        }
        let _ = writeln!(out, "     solution:    {}", verdict.correct_selections.join(", "));
    }
    out
}
