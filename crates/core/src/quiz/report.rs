use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Question, QuestionId};
use crate::quiz::settings::PASS_THRESHOLD_PERCENT;

/// Committed answers keyed by question, each in the order the options were picked.
pub type UserAnswers = HashMap<QuestionId, Vec<String>>;

/// Grading outcome for one question of a finished quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionVerdict {
    /// 1-based position in the quiz.
    pub index: usize,
    pub question_id: QuestionId,
    pub question_text: String,
    pub user_selections: Vec<String>,
    pub correct_selections: Vec<String>,
    pub is_correct: bool,
}

impl QuestionVerdict {
    /// Each user selection paired with whether it belongs to the correct set.
    pub fn marked_selections(&self) -> impl Iterator<Item = (&str, bool)> {
        self.user_selections
            .iter()
            .map(|s| (s.as_str(), self.correct_selections.contains(s)))
    }

    #[must_use]
    pub fn was_answered(&self) -> bool {
        !self.user_selections.is_empty()
    }
}

/// Final report: per-question verdicts plus the aggregate score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizReport {
    pub verdicts: Vec<QuestionVerdict>,
    pub correct_count: usize,
    pub total_questions: usize,
    pub score_percent: u8,
    pub passed: bool,
}

/// Strict set comparison: same size and every pick is a correct answer.
#[must_use]
pub fn is_correct(selected: &[String], correct: &[String]) -> bool {
    selected.len() == correct.len() && selected.iter().all(|s| correct.contains(s))
}

/// `round(100 * correct / total)`, rounding halves up. Zero when `total` is zero.
#[must_use]
pub fn score_percent(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total);
    let rounded = (200 * correct + total) / (2 * total);
    u8::try_from(rounded).unwrap_or(100)
}

/// Grade `questions` against `answers`.
///
/// Questions with no entry in `answers` grade as incorrect.
#[must_use]
pub fn grade(questions: &[Question], answers: &UserAnswers) -> QuizReport {
    let verdicts: Vec<QuestionVerdict> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let user_selections = answers.get(&q.id()).cloned().unwrap_or_default();
            let correct_selections = q.answers().to_vec();
            QuestionVerdict {
                index: i + 1,
                question_id: q.id(),
                question_text: q.question_text().to_owned(),
                is_correct: is_correct(&user_selections, &correct_selections),
                user_selections,
                correct_selections,
            }
        })
        .collect();

    let correct_count = verdicts.iter().filter(|v| v.is_correct).count();
    let total_questions = verdicts.len();
    let score = score_percent(correct_count, total_questions);

    QuizReport {
        verdicts,
        correct_count,
        total_questions,
        score_percent: score,
        passed: score >= PASS_THRESHOLD_PERCENT,
    }
}
