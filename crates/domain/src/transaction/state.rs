//! Payment status state machine and providers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The payment status of a transaction.
///
/// State transitions:
/// ```text
/// Pending ──┬──► Paid ──► Refunded
///           ├──► Failed ──┬──► Paid
///           │             └──► Cancelled
///           └──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Cancelled,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 5] = [
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::Cancelled,
        PaymentStatus::Failed,
        PaymentStatus::Refunded,
    ];

    /// Returns true if the state machine allows moving to `next`.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, Paid | Failed | Cancelled) | (Failed, Paid | Cancelled) | (Paid, Refunded)
        )
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Cancelled | PaymentStatus::Refunded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Cancelled => "Cancelled",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Refunded => "Refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = ParsePaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParsePaymentError::Status(s.to_string()))
    }
}

/// The payment gateway that handled a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentProvider {
    /// No gateway involved (free or mock flows).
    #[default]
    None,
    VnPay,
    Momo,
    ZaloPay,
    Stripe,
}

impl PaymentProvider {
    pub const ALL: [PaymentProvider; 5] = [
        PaymentProvider::None,
        PaymentProvider::VnPay,
        PaymentProvider::Momo,
        PaymentProvider::ZaloPay,
        PaymentProvider::Stripe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentProvider::None => "None",
            PaymentProvider::VnPay => "VnPay",
            PaymentProvider::Momo => "Momo",
            PaymentProvider::ZaloPay => "ZaloPay",
            PaymentProvider::Stripe => "Stripe",
        }
    }
}

impl std::fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentProvider {
    type Err = ParsePaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|provider| provider.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParsePaymentError::Provider(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsePaymentError {
    #[error("Unknown payment status: {0}")]
    Status(String),

    #[error("Unknown payment provider: {0}")]
    Provider(String),
}
