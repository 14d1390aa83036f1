// src/models/lesson.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'lessons' table in the database.
/// A lesson belongs to one language level; its number is unique within
/// that level and drives ordering on the lessons page.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub level: String,
    pub lesson_number: i64,
    pub title: String,
    pub description: Option<String>,
}

/// Per-lesson view for the lessons page: completion flag and last score
/// for the current user.
#[derive(Debug, Serialize)]
pub struct LessonStatus {
    pub lesson_number: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub score: i64,
}

/// DTO for creating a new lesson (admin).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLessonRequest {
    #[validate(length(min = 2, max = 2))]
    pub level: String,
    #[validate(range(min = 1))]
    pub lesson_number: i64,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}
