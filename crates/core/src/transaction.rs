//! Point transaction kinds and description helpers.
//!
//! Every change to a user's balance is recorded as exactly one immutable
//! `point_transactions` row whose `kind` is one of these values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default number of entries returned by a transaction history query.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Upper bound for a caller-supplied history limit.
pub const MAX_HISTORY_LIMIT: i64 = 200;

/// What caused a balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Manual award or deduction by an admin.
    AdminAward,
    /// Points credited for a first-time achievement unlock.
    Achievement,
    /// Points spent on a reward.
    Redemption,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 3] = [
        TransactionKind::AdminAward,
        TransactionKind::Achievement,
        TransactionKind::Redemption,
    ];

    /// The value persisted in `point_transactions.kind`.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::AdminAward => "admin_award",
            TransactionKind::Achievement => "achievement",
            TransactionKind::Redemption => "redemption",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description recorded when an achievement unlock credits points.
pub fn achievement_description(title: &str) -> String {
    format!("Achievement unlocked: {title}")
}

/// Description recorded when a reward is redeemed.
pub fn redemption_description(title: &str) -> String {
    format!("Redeemed: {title}")
}

/// Clamp a caller-supplied history limit into `1..=MAX_HISTORY_LIMIT`.
pub fn clamp_history_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT)
}
