//! Reward catalog models and DTOs.

use quest_core::types::{DbId, Points, Timestamp};
use quest_core::validation::MAX_AWARD;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `rewards` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reward {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub points_cost: Points,
    pub category: String,
    /// Remaining units; decremented once per successful redemption.
    pub stock: i32,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new reward. `stock` defaults to 999.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReward {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: String,
    pub icon: Option<String>,
    #[validate(range(min = 1, max = MAX_AWARD))]
    pub points_cost: Points,
    pub category: Option<String>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub image_url: Option<String>,
}

/// Request body for `PUT /rewards/{id}/stock`.
#[derive(Debug, Clone, Deserialize)]
pub struct RestockReward {
    pub stock: i32,
}
