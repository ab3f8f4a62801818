//! Leaderboard projection.

use quest_core::types::{DbId, Points};
use serde::Serialize;
use sqlx::FromRow;

/// One ranked row of the leaderboard.
#[derive(Debug, Clone, FromRow, Serialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: i64,
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    pub points: Points,
    pub total_points_earned: Points,
    pub level: i32,
    pub streak_days: i32,
    pub achievement_count: i64,
}

/// Query parameters for `GET /leaderboard`.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<i64>,
}
