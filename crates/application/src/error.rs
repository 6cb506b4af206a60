//! Application error types.

use store::StoreError;
use thiserror::Error;

/// Errors that abort a request instead of producing a failure outcome.
///
/// Rule violations are reported through `Outcome`; these are unexpected
/// conditions the caller cannot fix by changing its input.
#[derive(Debug, Error)]
pub enum AppError {
    /// No handler was registered for the request type.
    #[error("No handler registered for {0}")]
    HandlerNotRegistered(&'static str),

    /// Two handlers were registered for the same request type.
    #[error("Handler for {0} registered more than once")]
    DuplicateHandler(&'static str),

    /// The store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// State that should be impossible was found, e.g. a dangling reference.
    #[error("{0}")]
    Unexpected(String),
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
