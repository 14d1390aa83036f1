// src/scorer.rs

use std::collections::HashMap;

use crate::checker;
use crate::error::AppError;
use crate::models::progress::TaskVerdict;
use crate::models::task::Task;

/// Aggregate outcome of one lesson attempt.
#[derive(Debug)]
pub struct LessonScore {
    pub verdicts: Vec<TaskVerdict>,
    pub score: i64,
    pub correct_count: usize,
}

/// Scores a lesson attempt.
///
/// Tasks are checked in ascending id order (the persisted creation
/// order). A missing submission counts as an empty answer; submissions
/// are trimmed once at resolution, before any strategy-specific
/// comparison. Score is `floor(correct / total * 100)`; a lesson with no
/// tasks scores 0.
///
/// A malformed task aborts the whole attempt: bad authoring must surface
/// as a server error, never as a silently wrong answer.
pub fn score_lesson_attempt(
    tasks: &[Task],
    answers: &HashMap<i64, String>,
) -> Result<LessonScore, AppError> {
    let mut ordered: Vec<&Task> = tasks.iter().collect();
    ordered.sort_by_key(|task| task.id);

    let mut verdicts = Vec::with_capacity(ordered.len());
    let mut correct_count = 0;

    for task in &ordered {
        let (_, variant) = checker::strategy_for(task)?;
        let submitted = answers
            .get(&task.id)
            .map(|answer| answer.trim().to_string())
            .unwrap_or_default();
        let is_correct = checker::evaluate(&variant, &submitted);

        if is_correct {
            correct_count += 1;
        }

        verdicts.push(TaskVerdict {
            task_id: task.id,
            question: task.question.clone(),
            submitted,
            is_correct,
            correct_answer: task.correct_answer.clone(),
        });
    }

    let score = if ordered.is_empty() {
        0
    } else {
        (correct_count * 100 / ordered.len()) as i64
    };

    Ok(LessonScore {
        verdicts,
        score,
        correct_count,
    })
}
