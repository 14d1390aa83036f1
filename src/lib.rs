// src/lib.rs

pub mod checker;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod progress;
pub mod progression;
pub mod routes;
pub mod scorer;
pub mod state;
pub mod utils;

// Re-export specific items for convenience if needed
pub use routes::create_router;
