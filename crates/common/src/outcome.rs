//! Success/failure wrapper returned by command handlers.
//!
//! An [`Outcome`] is either a success carrying a value, or a failure carrying
//! a non-empty, human readable message. The two are mutually exclusive, which
//! the enum shape enforces; [`Outcome::from_parts`] is the checked entry point
//! for callers that hold the raw pieces.

use thiserror::Error;

const DEFAULT_FAILURE_MESSAGE: &str = "Operation failed";

/// Classifies an expected failure so the HTTP layer can pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The target of the operation does not exist.
    NotFound,
    /// The input or the current state does not allow the operation.
    Invalid,
}

/// An expected, recoverable failure with a non-empty message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    kind: FailureKind,
    message: String,
}

impl Failure {
    /// Creates an `Invalid` failure. Blank messages are replaced with a generic one.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::with_kind(FailureKind::Invalid, message)
    }

    /// Creates a `NotFound` failure. Blank messages are replaced with a generic one.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_kind(FailureKind::NotFound, message)
    }

    fn with_kind(kind: FailureKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            DEFAULT_FAILURE_MESSAGE.to_string()
        } else {
            message
        };
        Self { kind, message }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

// Domain errors convert into invalid failures through `?`. `Failure` itself
// does not implement `Error`, otherwise this impl would overlap `From<T> for T`.
impl<E: std::error::Error> From<E> for Failure {
    fn from(err: E) -> Self {
        Self::invalid(err.to_string())
    }
}

/// Raised by [`Outcome::from_parts`] when the pieces break the outcome invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutcomeError {
    #[error("a failed outcome must carry a non-empty error message")]
    FailureWithoutError,

    #[error("an outcome cannot carry both a value and an error")]
    ValueAndError,
}

/// Result of a command: a value on success, or a [`Failure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T = ()> {
    Success(T),
    Failure(Failure),
}

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Self::Success(value)
    }

    /// Creates an `Invalid` failure. An empty or blank message becomes
    /// `"Operation failed"`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(Failure::invalid(message))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Failure(Failure::not_found(message))
    }

    /// Assembles an outcome from an optional value and an optional error.
    ///
    /// Exactly one of the two must be present, and the error must not be blank.
    pub fn from_parts(value: Option<T>, error: Option<String>) -> Result<Self, OutcomeError> {
        match (value, error) {
            (Some(_), Some(_)) => Err(OutcomeError::ValueAndError),
            (Some(value), None) => Ok(Self::Success(value)),
            (None, Some(message)) if message.trim().is_empty() => {
                Err(OutcomeError::FailureWithoutError)
            }
            (None, Some(message)) => Ok(Self::Failure(Failure::invalid(message))),
            (None, None) => Err(OutcomeError::FailureWithoutError),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// The failure message, or `""` on success.
    pub fn error(&self) -> &str {
        match self {
            Self::Success(_) => "",
            Self::Failure(failure) => failure.message(),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure.kind()),
        }
    }

    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(failure) => Err(failure),
        }
    }

    /// Maps the success value, leaving failures untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Failure(failure) => Outcome::Failure(failure),
        }
    }
}

impl Outcome<()> {
    /// Success without a value.
    pub fn ok() -> Self {
        Self::Success(())
    }
}

impl<T> From<Result<T, Failure>> for Outcome<T> {
    fn from(result: Result<T, Failure>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(failure) => Self::Failure(failure),
        }
    }
}
