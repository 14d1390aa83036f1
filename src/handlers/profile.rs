// src/handlers/profile.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::user::{MeResponse, Profile, User},
    progress, progression,
    utils::jwt::Claims,
};

/// Account page data: user info, ancillary profile state, the ordered
/// unlocked levels and the full attempt history.
pub async fn get_me(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id();

    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password, role, created_at FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    let profile = fetch_or_create_profile(&pool, user_id).await?;

    let unlocked = progression::unlocked_levels(&pool, user_id).await?;
    let language_level = unlocked
        .last()
        .map(|code| code.as_str().to_string())
        .unwrap_or_default();

    let records = progress::attempts_for_user(&pool, user_id).await?;

    Ok(Json(MeResponse {
        id: user.id,
        username: user.username,
        role: user.role,
        created_at: user.created_at,
        streak_days: profile.streak_days,
        achievements: profile.achievements,
        language_level,
        unlocked_levels: unlocked
            .into_iter()
            .map(|code| code.as_str().to_string())
            .collect(),
        progress: records,
    }))
}

/// Registration creates the profile row, but accounts predating that
/// may lack one; create it lazily here.
async fn fetch_or_create_profile(pool: &SqlitePool, user_id: i64) -> Result<Profile, AppError> {
    let existing = sqlx::query_as::<_, Profile>(
        "SELECT id, user_id, streak_days, achievements, created_at FROM profiles WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    if let Some(profile) = existing {
        return Ok(profile);
    }

    let profile = sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profiles (user_id)
        VALUES (?)
        RETURNING id, user_id, streak_days, achievements, created_at
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(profile)
}
