//! Error types shared by the scheduler, the store and the export module.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("card {card_id} is not part of deck '{deck}'")]
    ItemNotFoundInPool { card_id: i64, deck: String },
    #[error("invalid review state: {0}")]
    InvalidState(String),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
