//! Point transaction audit rows.

use quest_core::transaction::TransactionKind;
use quest_core::types::{DbId, Points, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the append-only `point_transactions` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointTransaction {
    pub id: DbId,
    pub user_id: DbId,
    /// Signed: positive for credits, negative for deductions and spending.
    pub amount: Points,
    pub kind: String,
    pub description: String,
    pub actor_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// Insert payload for a new transaction row.
#[derive(Debug, Clone)]
pub struct NewPointTransaction {
    pub user_id: DbId,
    pub amount: Points,
    pub kind: TransactionKind,
    pub description: String,
    pub actor_id: Option<DbId>,
}

/// Query parameters for `GET /users/{id}/transactions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionHistoryParams {
    pub limit: Option<i64>,
}
