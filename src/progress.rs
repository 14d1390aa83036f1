// src/progress.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::level::LevelCode;
use crate::models::progress::UserTasksProgress;

/// Upserts the attempt outcome for one (user, level, lesson) triple.
///
/// First submission inserts a row; resubmission overwrites result and
/// timestamp in place (last-write-wins). The `ON CONFLICT` clause keyed
/// on the unique triple makes the write atomic, so a racing submission
/// can never produce a second row for the same lesson.
pub async fn record_attempt(
    pool: &SqlitePool,
    user_id: i64,
    level: LevelCode,
    lesson: i64,
    score: i64,
) -> Result<UserTasksProgress, AppError> {
    let record = sqlx::query_as::<_, UserTasksProgress>(
        r#"
        INSERT INTO user_tasks_progress (user_id, level, lesson, result, completed_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(user_id, level, lesson) DO UPDATE SET
            result = excluded.result,
            completed_at = excluded.completed_at
        RETURNING id, user_id, level, lesson, result, completed_at
        "#,
    )
    .bind(user_id)
    .bind(level.as_str())
    .bind(lesson)
    .bind(score)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to upsert attempt record: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(record)
}

/// Fetches the attempt record for one (user, level, lesson), if any.
pub async fn find_attempt(
    pool: &SqlitePool,
    user_id: i64,
    level: LevelCode,
    lesson: i64,
) -> Result<Option<UserTasksProgress>, AppError> {
    let record = sqlx::query_as::<_, UserTasksProgress>(
        r#"
        SELECT id, user_id, level, lesson, result, completed_at
        FROM user_tasks_progress
        WHERE user_id = ? AND level = ? AND lesson = ?
        "#,
    )
    .bind(user_id)
    .bind(level.as_str())
    .bind(lesson)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// All attempt records of a user under one level, by lesson number.
pub async fn attempts_for_level(
    pool: &SqlitePool,
    user_id: i64,
    level: LevelCode,
) -> Result<Vec<UserTasksProgress>, AppError> {
    let records = sqlx::query_as::<_, UserTasksProgress>(
        r#"
        SELECT id, user_id, level, lesson, result, completed_at
        FROM user_tasks_progress
        WHERE user_id = ? AND level = ?
        ORDER BY lesson
        "#,
    )
    .bind(user_id)
    .bind(level.as_str())
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// The full attempt history of a user, by level then lesson number.
pub async fn attempts_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<UserTasksProgress>, AppError> {
    let records = sqlx::query_as::<_, UserTasksProgress>(
        r#"
        SELECT id, user_id, level, lesson, result, completed_at
        FROM user_tasks_progress
        WHERE user_id = ?
        ORDER BY level, lesson
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
}
