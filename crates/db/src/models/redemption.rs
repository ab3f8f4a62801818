//! Reward redemption records.

use quest_core::error::CoreError;
use quest_core::redemption::RedemptionStatus;
use quest_core::types::{DbId, Points, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `reward_redemptions` table.
///
/// Rows are never deleted; only `status`, `notes` and the fulfilment stamps
/// change over time.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct RewardRedemption {
    pub id: DbId,
    pub user_id: DbId,
    pub reward_id: DbId,
    /// Cost snapshot taken at purchase time.
    pub points_spent: Points,
    pub status: String,
    pub notes: Option<String>,
    pub redeemed_at: Timestamp,
    pub fulfilled_at: Option<Timestamp>,
    pub fulfilled_by: Option<DbId>,
    pub updated_at: Timestamp,
}

impl RewardRedemption {
    /// Parse the stored status string.
    pub fn status(&self) -> Result<RedemptionStatus, CoreError> {
        self.status.parse()
    }
}

/// Request body for `PATCH /admin/redemptions/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRedemptionStatus {
    pub status: String,
    pub notes: Option<String>,
}

/// Query parameters for redemption listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedemptionListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
