use thiserror::Error;

use crate::AggregateId;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document of this kind exists with the given id.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: AggregateId },

    /// A document of this kind already exists with the given id.
    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: &'static str, id: AggregateId },

    /// An event envelope was built without one of its required fields.
    #[error("Invalid event: missing {0}")]
    InvalidEvent(&'static str),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
