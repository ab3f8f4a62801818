//! Achievement definitions and per-user unlock records.

use quest_core::types::{DbId, Points, Timestamp};
use quest_core::validation::MAX_AWARD;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `achievements` table.
///
/// Achievements are soft-deleted (`is_active = false`) so past unlocks keep
/// a valid reference.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Achievement {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub points_reward: Points,
    pub category: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `user_achievements` table. At most one per
/// `(user_id, achievement_id)`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserAchievement {
    pub id: DbId,
    pub user_id: DbId,
    pub achievement_id: DbId,
    pub awarded_by: Option<DbId>,
    pub unlocked_at: Timestamp,
}

/// Unlock record joined with its achievement for profile listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UnlockedAchievement {
    pub id: DbId,
    pub achievement_id: DbId,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub points_reward: Points,
    pub category: String,
    pub awarded_by: Option<DbId>,
    pub unlocked_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a new achievement.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAchievement {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: String,
    pub icon: Option<String>,
    #[validate(range(min = 0, max = MAX_AWARD))]
    pub points_reward: Points,
    pub category: Option<String>,
}

/// Request body for `POST /achievements/{id}/award`.
#[derive(Debug, Clone, Deserialize)]
pub struct AwardAchievementRequest {
    pub user_id: DbId,
}
