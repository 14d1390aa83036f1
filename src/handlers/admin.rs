// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        audio::CreateAudioRequest,
        lesson::CreateLessonRequest,
        level::LevelCode,
        task::{CreateTaskRequest, Task},
    },
};

/// Creates a new lesson under a level.
/// Admin only.
pub async fn create_lesson(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateLessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    let level = LevelCode::parse(&payload.level)?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO lessons (level, lesson_number, title, description)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(level.as_str())
    .bind(payload.lesson_number)
    .bind(&payload.title)
    .bind(&payload.description)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            AppError::Conflict(format!(
                "Lesson {} already exists under level {}",
                payload.lesson_number, level
            ))
        } else {
            tracing::error!("Failed to create lesson: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Creates a new task under a lesson.
///
/// The answer shape is validated at authoring time by resolving the
/// checking variant; a task that would fail at submission time is
/// rejected here with 400 instead.
pub async fn create_task(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let lesson_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM lessons WHERE id = ?")
        .bind(payload.lesson_id)
        .fetch_optional(&pool)
        .await?;
    if lesson_exists.is_none() {
        return Err(AppError::NotFound("Lesson not found".to_string()));
    }

    let draft = Task {
        id: 0,
        lesson_id: payload.lesson_id,
        question: payload.question.clone(),
        correct_answer: payload.correct_answer.clone(),
        option1: payload.option1.clone().unwrap_or_default(),
        option2: payload.option2.clone().unwrap_or_default(),
        option3: payload.option3.clone().unwrap_or_default(),
        audio_id: payload.audio_id,
    };
    if let Err(e) = draft.variant() {
        return Err(AppError::BadRequest(format!(
            "Task definition is not checkable: {}",
            e
        )));
    }

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO tasks (lesson_id, question, correct_answer, option1, option2, option3, audio_id)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(draft.lesson_id)
    .bind(&draft.question)
    .bind(&draft.correct_answer)
    .bind(&draft.option1)
    .bind(&draft.option2)
    .bind(&draft.option3)
    .bind(draft.audio_id)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Registers an audio resource for listening tasks.
/// Admin only.
pub async fn create_audio(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateAudioRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO audio (title, description, file_url)
        VALUES (?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.file_url)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Deletes a lesson and, via cascade, its tasks.
/// Admin only.
pub async fn delete_lesson(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let affected = sqlx::query("DELETE FROM lessons WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await?
        .rows_affected();

    if affected == 0 {
        return Err(AppError::NotFound("Lesson not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Deletes a single task.
/// Admin only.
pub async fn delete_task(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let affected = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await?
        .rows_affected();

    if affected == 0 {
        return Err(AppError::NotFound("Task not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
