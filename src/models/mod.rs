// src/models/mod.rs

pub mod audio;
pub mod lesson;
pub mod level;
pub mod progress;
pub mod task;
pub mod user;
