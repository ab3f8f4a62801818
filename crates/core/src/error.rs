use crate::types::{DbId, Points};

/// Domain error taxonomy shared by every layer.
///
/// Validation-style variants (`NotFound`, `InsufficientBalance`,
/// `OutOfStock`, `InvalidTransition`, `Validation`) describe a declined
/// operation: the ledger was left untouched. `StorageUnavailable` is the one
/// variant that means the backing store itself failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Insufficient balance: {required} points required, {available} available")]
    InsufficientBalance { required: Points, available: Points },

    #[error("Reward {reward_id} is out of stock")]
    OutOfStock { reward_id: DbId },

    #[error("Invalid status transition from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// `true` when the error reports a declined operation rather than a
    /// failure of the system.
    pub fn is_declined(&self) -> bool {
        !matches!(
            self,
            CoreError::StorageUnavailable(_) | CoreError::Internal(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_failures_are_not_declines() {
        assert!(!CoreError::StorageUnavailable("down".into()).is_declined());
        assert!(!CoreError::Internal("bug".into()).is_declined());
    }

    #[test]
    fn validation_failures_are_declines() {
        assert!(CoreError::OutOfStock { reward_id: 1 }.is_declined());
        assert!(CoreError::InsufficientBalance {
            required: 500,
            available: 200
        }
        .is_declined());
        assert!(CoreError::NotFound {
            entity: "User",
            id: 9
        }
        .is_declined());
    }

    #[test]
    fn insufficient_balance_message_names_both_amounts() {
        let err = CoreError::InsufficientBalance {
            required: 500,
            available: 200,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance: 500 points required, 200 available"
        );
    }
}
