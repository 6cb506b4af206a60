//! Subscription status state machine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The status of a user subscription.
///
/// State transitions:
/// ```text
/// Pending ──► Active ◄──► Suspended
///    │          │             │
///    └──────────┴─────────────┴──► Cancelled
///
/// Active | Suspended ──► Expired
/// Active | Suspended ──renew──► Active
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SubscriptionStatus {
    /// Created, awaiting payment.
    #[default]
    Pending,

    /// Paid for and usable.
    Active,

    /// Temporarily disabled; can be reactivated.
    Suspended,

    /// Cancelled by the user or an admin (terminal state).
    Cancelled,

    /// Ran past its end date (terminal state).
    Expired,
}

impl SubscriptionStatus {
    pub const ALL: [SubscriptionStatus; 5] = [
        SubscriptionStatus::Pending,
        SubscriptionStatus::Active,
        SubscriptionStatus::Suspended,
        SubscriptionStatus::Cancelled,
        SubscriptionStatus::Expired,
    ];

    /// Returns true if the subscription can be activated in this state.
    pub fn can_activate(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Pending | SubscriptionStatus::Suspended
        )
    }

    /// Returns true if the subscription can be suspended in this state.
    pub fn can_suspend(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }

    /// Returns true if the subscription can be cancelled in this state.
    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Pending | SubscriptionStatus::Active | SubscriptionStatus::Suspended
        )
    }

    /// Returns true if the subscription can be renewed in this state.
    pub fn can_renew(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Active | SubscriptionStatus::Suspended
        )
    }

    /// Returns true if the subscription can be marked expired in this state.
    pub fn can_expire(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Active | SubscriptionStatus::Suspended
        )
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Cancelled | SubscriptionStatus::Expired
        )
    }

    /// Pending, Active and Suspended subscriptions still hold on to their tier.
    pub fn is_live(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "Pending",
            SubscriptionStatus::Active => "Active",
            SubscriptionStatus::Suspended => "Suspended",
            SubscriptionStatus::Cancelled => "Cancelled",
            SubscriptionStatus::Expired => "Expired",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown subscription status: {0}")]
pub struct ParseStatusError(pub String);

impl std::str::FromStr for SubscriptionStatus {
    type Err = ParseStatusError;

    /// Parses a status name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_pending() {
        assert_eq!(SubscriptionStatus::default(), SubscriptionStatus::Pending);
    }

    #[test]
    fn test_can_activate_from_pending_or_suspended() {
        assert!(SubscriptionStatus::Pending.can_activate());
        assert!(!SubscriptionStatus::Active.can_activate());
        assert!(SubscriptionStatus::Suspended.can_activate());
        assert!(!SubscriptionStatus::Cancelled.can_activate());
        assert!(!SubscriptionStatus::Expired.can_activate());
    }

    #[test]
    fn test_only_active_can_suspend() {
        assert!(!SubscriptionStatus::Pending.can_suspend());
        assert!(SubscriptionStatus::Active.can_suspend());
        assert!(!SubscriptionStatus::Suspended.can_suspend());
        assert!(!SubscriptionStatus::Cancelled.can_suspend());
        assert!(!SubscriptionStatus::Expired.can_suspend());
    }

    #[test]
    fn test_can_cancel_from_non_terminal_states() {
        assert!(SubscriptionStatus::Pending.can_cancel());
        assert!(SubscriptionStatus::Active.can_cancel());
        assert!(SubscriptionStatus::Suspended.can_cancel());
        assert!(!SubscriptionStatus::Cancelled.can_cancel());
        assert!(!SubscriptionStatus::Expired.can_cancel());
    }

    #[test]
    fn test_renew_and_expire_need_a_paid_subscription() {
        for status in SubscriptionStatus::ALL {
            let paid = matches!(
                status,
                SubscriptionStatus::Active | SubscriptionStatus::Suspended
            );
            assert_eq!(status.can_renew(), paid, "{status}");
            assert_eq!(status.can_expire(), paid, "{status}");
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SubscriptionStatus::Pending.is_terminal());
        assert!(!SubscriptionStatus::Active.is_terminal());
        assert!(!SubscriptionStatus::Suspended.is_terminal());
        assert!(SubscriptionStatus::Cancelled.is_terminal());
        assert!(SubscriptionStatus::Expired.is_terminal());
    }

    #[test]
    fn test_parse_ignores_case() {
        assert_eq!(
            "active".parse::<SubscriptionStatus>(),
            Ok(SubscriptionStatus::Active)
        );
        assert_eq!(
            "SUSPENDED".parse::<SubscriptionStatus>(),
            Ok(SubscriptionStatus::Suspended)
        );
        assert!("paused".parse::<SubscriptionStatus>().is_err());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&SubscriptionStatus::Suspended).unwrap();
        assert_eq!(json, "\"Suspended\"");
    }
}
