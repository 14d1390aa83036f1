// src/checker.rs

use crate::error::AppError;
use crate::models::task::{Task, TaskVariant};

/// Resolves the answer-checking variant and its channel label for a task.
///
/// The page handler uses the channel label to know which form-field
/// naming convention (`task_<id>` vs `audio_answer_<id>`) the submission
/// arrives under.
pub fn strategy_for(task: &Task) -> Result<(&'static str, TaskVariant), AppError> {
    let variant = task.variant()?;
    Ok((variant.channel(), variant))
}

/// Evaluates one submitted answer against a resolved task variant.
///
/// Multiple-choice: exact, case-sensitive comparison against the option
/// named by the 1-based answer index. No normalization.
///
/// Free-text/audio: both sides have whitespace runs collapsed to single
/// spaces, outer whitespace trimmed, and are lowercased before an exact
/// comparison. Intentionally nothing beyond that: no stemming, no
/// punctuation stripping, no locale-aware folding.
pub fn evaluate(variant: &TaskVariant, submission: &str) -> bool {
    match variant {
        TaskVariant::MultipleChoice {
            options,
            correct_index,
        } => submission == options[correct_index - 1],
        TaskVariant::FreeText { expected } => normalize(submission) == normalize(expected),
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
