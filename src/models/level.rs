// src/models/level.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

/// Represents the 'language_levels' table in the database.
/// Immutable reference data, seeded at startup.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LanguageLevel {
    pub id: i64,
    pub level: String,
    pub description: Option<String>,
}

/// The fixed, totally ordered sequence of proficiency levels.
///
/// Ordering of the enum variants is the progression order; the derived
/// `Ord` matches `A1 < A2 < B1 < B2 < C1 < C2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LevelCode {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl LevelCode {
    pub const ALL: [LevelCode; 6] = [
        LevelCode::A1,
        LevelCode::A2,
        LevelCode::B1,
        LevelCode::B2,
        LevelCode::C1,
        LevelCode::C2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LevelCode::A1 => "A1",
            LevelCode::A2 => "A2",
            LevelCode::B1 => "B1",
            LevelCode::B2 => "B2",
            LevelCode::C1 => "C1",
            LevelCode::C2 => "C2",
        }
    }

    /// Parses a level code, case-insensitively ("a1" and "A1" both match).
    pub fn parse(code: &str) -> Result<LevelCode, AppError> {
        match code.to_ascii_uppercase().as_str() {
            "A1" => Ok(LevelCode::A1),
            "A2" => Ok(LevelCode::A2),
            "B1" => Ok(LevelCode::B1),
            "B2" => Ok(LevelCode::B2),
            "C1" => Ok(LevelCode::C1),
            "C2" => Ok(LevelCode::C2),
            _ => Err(AppError::InvalidLevel(code.to_string())),
        }
    }

    /// The next level in the fixed order, `None` for C2.
    pub fn successor(self) -> Option<LevelCode> {
        let index = LevelCode::ALL.iter().position(|l| *l == self)?;
        LevelCode::ALL.get(index + 1).copied()
    }
}

impl std::fmt::Display for LevelCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-level view for the level overview page: unlock and completion state
/// of one level for the current user.
#[derive(Debug, Serialize)]
pub struct LevelStatus {
    pub level: String,
    pub description: Option<String>,
    pub is_unlocked: bool,
    pub is_completed: bool,
}
