// src/models/task.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::AppError;

/// Represents the 'tasks' table in the database.
///
/// Exactly one of two shapes must hold: multiple-choice (at least one of
/// the option columns populated, `correct_answer` a 1-based index into
/// them) or free-text with an attached audio resource (`correct_answer`
/// the literal expected transcript). The shape is resolved once via
/// [`Task::variant`], never re-derived during checking.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub lesson_id: i64,
    pub question: String,
    pub correct_answer: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub audio_id: Option<i64>,
}

/// The closed set of answer-checking shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskVariant {
    /// `options` holds the raw (option1, option2, option3) triple;
    /// `correct_index` is 1-based and validated to point at a non-empty
    /// entry.
    MultipleChoice {
        options: Vec<String>,
        correct_index: usize,
    },
    /// Expected transcript of the attached audio.
    FreeText { expected: String },
}

impl TaskVariant {
    /// The answer channel the UI collects this task's input on.
    /// Also the form-field prefix (`task_<id>` / `audio_answer_<id>`).
    pub fn channel(&self) -> &'static str {
        match self {
            TaskVariant::MultipleChoice { .. } => "task",
            TaskVariant::FreeText { .. } => "audio_answer",
        }
    }
}

impl Task {
    /// Resolves the task's answer-checking variant.
    ///
    /// Options win over audio when both are present; a task with neither
    /// is an authoring error, as is a multiple-choice answer index that
    /// does not name a populated option.
    pub fn variant(&self) -> Result<TaskVariant, AppError> {
        let options = vec![
            self.option1.clone(),
            self.option2.clone(),
            self.option3.clone(),
        ];
        if options.iter().any(|option| !option.is_empty()) {
            let index = self.correct_answer.trim().parse::<usize>().unwrap_or(0);
            if index < 1 || index > options.len() || options[index - 1].is_empty() {
                return Err(AppError::AnswerIndexOutOfRange {
                    task_id: self.id,
                    index: index as i64,
                });
            }
            Ok(TaskVariant::MultipleChoice {
                options,
                correct_index: index,
            })
        } else if self.audio_id.is_some() {
            Ok(TaskVariant::FreeText {
                expected: self.correct_answer.clone(),
            })
        } else {
            Err(AppError::UnsupportedTaskType(self.id))
        }
    }
}

/// DTO for sending a task to the client (excludes the correct answer).
/// `channel` tells the frontend which input widget and field naming to
/// use; `options` lists only the populated choices.
#[derive(Debug, Serialize)]
pub struct PublicTask {
    pub id: i64,
    pub question: String,
    pub channel: &'static str,
    pub options: Vec<String>,
    pub audio_url: Option<String>,
}

/// DTO for creating a new task (admin).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    pub lesson_id: i64,
    #[validate(length(min = 1, max = 2000))]
    pub question: String,
    #[validate(length(min = 1, max = 255))]
    pub correct_answer: String,
    #[validate(length(max = 255))]
    pub option1: Option<String>,
    #[validate(length(max = 255))]
    pub option2: Option<String>,
    #[validate(length(max = 255))]
    pub option3: Option<String>,
    pub audio_id: Option<i64>,
}
