// src/handlers/lessons.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::{Sqlite, SqlitePool};

use crate::{
    config::{PASSING_SCORE, PERFECT_SCORE},
    error::AppError,
    models::{
        lesson::{Lesson, LessonStatus},
        level::{LanguageLevel, LevelCode, LevelStatus},
        progress::{LessonResultResponse, SubmitLessonRequest},
        task::{PublicTask, Task, TaskVariant},
    },
    progress, progression, scorer,
    utils::jwt::Claims,
};

/// Level overview: all six levels with the current user's unlock and
/// completion state for each.
pub async fn list_levels(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id();

    let levels = sqlx::query_as::<_, LanguageLevel>(
        "SELECT id, level, description FROM language_levels ORDER BY level",
    )
    .fetch_all(&pool)
    .await?;

    let unlocked = progression::unlocked_levels(&pool, user_id).await?;

    let mut levels_data = Vec::with_capacity(levels.len());
    for level in levels {
        let is_unlocked = unlocked.iter().any(|code| code.as_str() == level.level);
        let is_completed = progression::is_level_completed(&pool, user_id, &level.level).await?;
        levels_data.push(LevelStatus {
            level: level.level,
            description: level.description,
            is_unlocked,
            is_completed,
        });
    }

    Ok(Json(levels_data))
}

/// Lessons of one level, ordered by lesson number, with the user's last
/// score and completion flag per lesson.
pub async fn list_lessons(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(level): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let level = LevelCode::parse(&level)?;
    let user_id = claims.user_id();

    let lessons = sqlx::query_as::<_, Lesson>(
        r#"
        SELECT id, level, lesson_number, title, description
        FROM lessons
        WHERE level = ?
        ORDER BY lesson_number
        "#,
    )
    .bind(level.as_str())
    .fetch_all(&pool)
    .await?;

    let records = progress::attempts_for_level(&pool, user_id, level).await?;
    let by_lesson: HashMap<i64, i64> = records
        .into_iter()
        .map(|record| (record.lesson, record.result))
        .collect();

    let lessons_data: Vec<LessonStatus> = lessons
        .into_iter()
        .map(|lesson| {
            let score = by_lesson.get(&lesson.lesson_number).copied().unwrap_or(0);
            LessonStatus {
                lesson_number: lesson.lesson_number,
                title: lesson.title,
                description: lesson.description,
                is_completed: score == PERFECT_SCORE,
                score,
            }
        })
        .collect();

    Ok(Json(lessons_data))
}

/// The tasks of one lesson, with correct answers hidden and the answer
/// channel exposed so the client knows how to collect each input.
///
/// A lesson the user already finished at 100% refuses to reopen.
pub async fn get_lesson_tasks(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((level, lesson_number)): Path<(String, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let level = LevelCode::parse(&level)?;
    let user_id = claims.user_id();

    reject_if_already_perfect(&pool, user_id, level, lesson_number).await?;

    let lesson = fetch_lesson(&pool, level, lesson_number).await?;
    let tasks = fetch_tasks(&pool, lesson.id).await?;
    let audio_urls = fetch_audio_urls(&pool, &tasks).await?;

    let mut public_tasks = Vec::with_capacity(tasks.len());
    for task in &tasks {
        let variant = task.variant()?;
        let options = match &variant {
            TaskVariant::MultipleChoice { options, .. } => options
                .iter()
                .filter(|option| !option.is_empty())
                .cloned()
                .collect(),
            TaskVariant::FreeText { .. } => Vec::new(),
        };
        public_tasks.push(PublicTask {
            id: task.id,
            question: task.question.clone(),
            channel: variant.channel(),
            options,
            audio_url: task.audio_id.and_then(|id| audio_urls.get(&id).cloned()),
        });
    }

    Ok(Json(public_tasks))
}

/// Submits a lesson attempt: guard against resubmitting a perfect
/// lesson, check every task, store the score, and report per-task
/// verdicts plus an unlock congratulation when earned.
pub async fn submit_lesson(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((level, lesson_number)): Path<(String, i64)>,
    Json(req): Json<SubmitLessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    let level = LevelCode::parse(&level)?;
    let user_id = claims.user_id();

    reject_if_already_perfect(&pool, user_id, level, lesson_number).await?;

    let lesson = fetch_lesson(&pool, level, lesson_number).await?;
    let tasks = fetch_tasks(&pool, lesson.id).await?;

    let outcome = scorer::score_lesson_attempt(&tasks, &req.answers)?;

    // Checked before the write, as the notice keys off the successor
    // level's records only.
    let message =
        progression::next_level_notice(&pool, user_id, level, outcome.score).await?;

    progress::record_attempt(&pool, user_id, level, lesson_number, outcome.score).await?;

    tracing::info!(
        "User {} scored {} on {} lesson {}",
        user_id,
        outcome.score,
        level,
        lesson_number
    );

    Ok(Json(LessonResultResponse {
        tasks: outcome.verdicts,
        score: outcome.score,
        correct_count: outcome.correct_count,
        passed: outcome.score >= PASSING_SCORE,
        message,
    }))
}

/// Policy guard: a lesson stored at 100% must not be rescored, so a
/// later imperfect run can never overwrite a perfect one.
async fn reject_if_already_perfect(
    pool: &SqlitePool,
    user_id: i64,
    level: LevelCode,
    lesson_number: i64,
) -> Result<(), AppError> {
    let existing = progress::find_attempt(pool, user_id, level, lesson_number).await?;
    if existing.is_some_and(|record| record.result == PERFECT_SCORE) {
        return Err(AppError::Conflict(
            "You have already passed this lesson 100%!".to_string(),
        ));
    }
    Ok(())
}

async fn fetch_lesson(
    pool: &SqlitePool,
    level: LevelCode,
    lesson_number: i64,
) -> Result<Lesson, AppError> {
    sqlx::query_as::<_, Lesson>(
        r#"
        SELECT id, level, lesson_number, title, description
        FROM lessons
        WHERE level = ? AND lesson_number = ?
        "#,
    )
    .bind(level.as_str())
    .bind(lesson_number)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound(format!(
        "Lesson {} not found under level {}",
        lesson_number, level
    )))
}

async fn fetch_tasks(pool: &SqlitePool, lesson_id: i64) -> Result<Vec<Task>, AppError> {
    let tasks = sqlx::query_as::<_, Task>(
        r#"
        SELECT id, lesson_id, question, correct_answer,
               option1, option2, option3, audio_id
        FROM tasks
        WHERE lesson_id = ?
        ORDER BY id
        "#,
    )
    .bind(lesson_id)
    .fetch_all(pool)
    .await?;

    Ok(tasks)
}

/// Helper struct for fetching audio file locations.
#[derive(sqlx::FromRow)]
struct AudioUrl {
    id: i64,
    file_url: String,
}

async fn fetch_audio_urls(
    pool: &SqlitePool,
    tasks: &[Task],
) -> Result<HashMap<i64, String>, AppError> {
    let audio_ids: Vec<i64> = tasks.iter().filter_map(|task| task.audio_id).collect();
    if audio_ids.is_empty() {
        return Ok(HashMap::new());
    }

    // Dynamic IN clause
    let mut query_builder =
        sqlx::QueryBuilder::<Sqlite>::new("SELECT id, file_url FROM audio WHERE id IN (");
    let mut separated = query_builder.separated(",");
    for id in &audio_ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");

    let rows: Vec<AudioUrl> = query_builder.build_query_as().fetch_all(pool).await?;

    Ok(rows.into_iter().map(|row| (row.id, row.file_url)).collect())
}
