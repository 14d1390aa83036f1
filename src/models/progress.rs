// src/models/progress.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'user_tasks_progress' table in the database.
/// One row per (user, level, lesson), holding the most recent result of
/// a lesson attempt. Resubmission replaces the row in place.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserTasksProgress {
    pub id: i64,
    pub user_id: i64,
    pub level: String,
    pub lesson: i64,
    pub result: i64,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for submitting a lesson attempt.
/// Keys are task ids; values are the raw answers as collected from the
/// task's answer channel.
#[derive(Debug, Deserialize)]
pub struct SubmitLessonRequest {
    pub answers: HashMap<i64, String>,
}

/// Outcome of checking one task within a lesson attempt.
#[derive(Debug, Serialize)]
pub struct TaskVerdict {
    pub task_id: i64,
    pub question: String,
    pub submitted: String,
    pub is_correct: bool,
    pub correct_answer: String,
}

/// Full response to a lesson submission.
#[derive(Debug, Serialize)]
pub struct LessonResultResponse {
    pub tasks: Vec<TaskVerdict>,
    pub score: i64,
    pub correct_count: usize,
    pub passed: bool,
    /// One-time "level unlocked" congratulation, when applicable.
    pub message: Option<String>,
}
