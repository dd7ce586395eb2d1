//! Journal error type.

use thiserror::Error;

/// Result type for journal and storage operations.
pub type Result<T> = std::result::Result<T, JournalError>;

/// Errors that can occur in journal and storage operations.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid atomic write: {0}")]
    InvalidWrite(String),

    #[error("Sequence number {0} exceeds the storage range")]
    SequenceOutOfRange(u64),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),
}

impl From<sqlx::Error> for JournalError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                JournalError::IntegrityViolation(db.message().to_string())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => JournalError::Unavailable(err.to_string()),
            _ => JournalError::Database(err),
        }
    }
}
