//! Subscription tier aggregate.

mod aggregate;
mod events;

pub use aggregate::{SubscriptionTier, TierDetails};
pub use events::{TierEvent, TierRef, TierSnapshotData};

use thiserror::Error;

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
pub const MAX_IMAGE_URL_LENGTH: usize = 500;
/// About a hundred years.
pub const MAX_DURATION_IN_DAYS: u32 = 36_500;

/// Errors that can occur during tier operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierError {
    #[error("Name cannot be empty")]
    NameRequired,

    #[error("Name cannot exceed 100 characters")]
    NameTooLong,

    #[error("Description cannot be empty")]
    DescriptionRequired,

    #[error("Description cannot exceed 500 characters")]
    DescriptionTooLong,

    #[error("Duration must be greater than 0")]
    InvalidDuration,

    #[error("Duration cannot exceed 36500 days")]
    DurationTooLong,

    #[error("Image URL cannot exceed 500 characters")]
    ImageUrlTooLong,
}
