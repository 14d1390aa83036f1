// src/models/audio.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'audio' table in the database.
/// A playable resource referenced by listening tasks; never mutated by
/// the evaluation engine.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Audio {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub file_url: String,
}

/// DTO for registering a new audio resource (admin).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAudioRequest {
    #[validate(length(max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 1000))]
    pub file_url: String,
}
