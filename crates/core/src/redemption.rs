//! Reward redemption lifecycle.
//!
//! ```text
//! pending ──► approved ──► fulfilled
//!    │            │
//!    │            └──────► rejected
//!    ├──────────────────► fulfilled
//!    └──────────────────► rejected
//! ```
//!
//! `fulfilled` and `rejected` are terminal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionStatus {
    Pending,
    Approved,
    Fulfilled,
    Rejected,
}

impl RedemptionStatus {
    pub const ALL: [RedemptionStatus; 4] = [
        RedemptionStatus::Pending,
        RedemptionStatus::Approved,
        RedemptionStatus::Fulfilled,
        RedemptionStatus::Rejected,
    ];

    /// The value persisted in `reward_redemptions.status`.
    pub fn as_str(self) -> &'static str {
        match self {
            RedemptionStatus::Pending => "pending",
            RedemptionStatus::Approved => "approved",
            RedemptionStatus::Fulfilled => "fulfilled",
            RedemptionStatus::Rejected => "rejected",
        }
    }

    /// Whether `self -> next` is a legal forward transition.
    pub fn can_transition_to(self, next: RedemptionStatus) -> bool {
        use RedemptionStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Fulfilled)
                | (Pending, Rejected)
                | (Approved, Fulfilled)
                | (Approved, Rejected)
        )
    }

    /// Validate a transition, producing [`CoreError::InvalidTransition`] when
    /// it is not allowed.
    pub fn transition_to(self, next: RedemptionStatus) -> Result<RedemptionStatus, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }
}

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedemptionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RedemptionStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid redemption status '{s}'. Must be one of: pending, approved, fulfilled, rejected"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use RedemptionStatus::*;

    #[test]
    fn pending_moves_to_any_later_state() {
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Fulfilled));
        assert!(Pending.can_transition_to(Rejected));
    }

    #[test]
    fn approved_moves_to_terminal_states_only() {
        assert!(Approved.can_transition_to(Fulfilled));
        assert!(Approved.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Approved));
    }

    #[test]
    fn terminal_states_are_final() {
        for next in RedemptionStatus::ALL {
            assert!(!Fulfilled.can_transition_to(next));
            assert!(!Rejected.can_transition_to(next));
        }
    }

    #[test]
    fn invalid_transition_reports_both_states() {
        assert_matches!(
            Rejected.transition_to(Fulfilled),
            Err(CoreError::InvalidTransition { from, to }) if from == "rejected" && to == "fulfilled"
        );
    }

    #[test]
    fn parse_rejects_unknown_status() {
        assert_eq!("approved".parse::<RedemptionStatus>(), Ok(Approved));
        assert_matches!("shipped".parse::<RedemptionStatus>(), Err(CoreError::Validation(_)));
    }
}
