// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., duplicate username, already-perfect lesson)
    Conflict(String),

    /// A task satisfies neither the multiple-choice nor the audio shape.
    /// Content-authoring error, carries the offending task id.
    UnsupportedTaskType(i64),

    /// `correct_answer` of a multiple-choice task does not point at a
    /// populated option. Content-authoring error, not a wrong answer.
    AnswerIndexOutOfRange { task_id: i64, index: i64 },

    /// A level code outside the fixed A1..C2 sequence.
    InvalidLevel(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::UnsupportedTaskType(task_id) => {
                tracing::error!("Task {} has neither options nor audio", task_id);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Lesson content is misconfigured".to_string(),
                )
            }
            AppError::AnswerIndexOutOfRange { task_id, index } => {
                tracing::error!("Task {} has answer index {} out of range", task_id, index);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Lesson content is misconfigured".to_string(),
                )
            }
            AppError::InvalidLevel(code) => (
                StatusCode::NOT_FOUND,
                format!("Unknown language level '{}'", code),
            ),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
