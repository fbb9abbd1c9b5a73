//! Error types for Habitline

use thiserror::Error;

/// Errors that can occur while shaping tracker data
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid month: {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Invalid tracker config: {0}")]
    InvalidConfig(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
