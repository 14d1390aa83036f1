// src/progression.rs

use sqlx::SqlitePool;

use crate::config::{PASSING_SCORE, PERFECT_SCORE};
use crate::error::AppError;
use crate::models::level::LevelCode;

/// Derives the ordered set of unlocked levels for a user.
///
/// Recomputed from lesson definitions and attempt history on every call,
/// never cached, so it self-corrects when lessons are added or removed.
/// A1 is always unlocked; each further level requires every lesson of the
/// previous one to have a stored result of at least [`PASSING_SCORE`].
pub async fn unlocked_levels(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<LevelCode>, AppError> {
    let mut unlocked = vec![LevelCode::A1];

    for pair in LevelCode::ALL.windows(2) {
        if all_lessons_at_least(pool, user_id, pair[0], PASSING_SCORE).await? {
            unlocked.push(pair[1]);
        } else {
            break;
        }
    }

    Ok(unlocked)
}

/// Whether every lesson of a level has a perfect stored result.
/// Stricter than the unlock gate; drives the completion checkmark.
pub async fn is_level_completed(
    pool: &SqlitePool,
    user_id: i64,
    level: &str,
) -> Result<bool, AppError> {
    let level = LevelCode::parse(level)?;
    all_lessons_at_least(pool, user_id, level, PERFECT_SCORE).await
}

/// One-time "level unlocked" congratulation after a passing attempt.
///
/// Fires when the attempt passed, the level has a successor, and the user
/// has no attempt record at all under that successor. This approximates
/// the unlock transition from the absence of successor records rather
/// than the true state-machine edge, so it can misfire; kept as designed.
pub async fn next_level_notice(
    pool: &SqlitePool,
    user_id: i64,
    level: LevelCode,
    score: i64,
) -> Result<Option<String>, AppError> {
    if score < PASSING_SCORE {
        return Ok(None);
    }
    let Some(next) = level.successor() else {
        return Ok(None);
    };

    let attempts: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM user_tasks_progress WHERE user_id = ? AND level = ?",
    )
    .bind(user_id)
    .bind(next.as_str())
    .fetch_one(pool)
    .await?;

    if attempts == 0 {
        Ok(Some(format!(
            "Congratulations! Level {} is open to you!",
            next
        )))
    } else {
        Ok(None)
    }
}

/// True when no lesson of the level lacks a record at or above
/// `threshold`. A level without lessons is vacuously cleared.
async fn all_lessons_at_least(
    pool: &SqlitePool,
    user_id: i64,
    level: LevelCode,
    threshold: i64,
) -> Result<bool, AppError> {
    let blocking: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM lessons l
        LEFT JOIN user_tasks_progress p
            ON p.user_id = ? AND p.level = l.level AND p.lesson = l.lesson_number
        WHERE l.level = ? AND (p.result IS NULL OR p.result < ?)
        "#,
    )
    .bind(user_id)
    .bind(level.as_str())
    .bind(threshold)
    .fetch_one(pool)
    .await?;

    Ok(blocking == 0)
}
