//! User entity model and DTOs.

use quest_core::roles::is_admin;
use quest_core::types::{DbId, Points, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    /// Spendable balance.
    pub points: Points,
    /// Lifetime sum of positive awards; never decreases.
    pub total_points_earned: Points,
    /// Generated column: `total_points_earned / 100 + 1`.
    pub level: i32,
    pub streak_days: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn is_admin(&self) -> bool {
        is_admin(&self.role)
    }
}

/// Safe user representation for API responses and event payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub points: Points,
    pub total_points_earned: Points,
    pub level: i32,
    pub streak_days: i32,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role.clone(),
            points: user.points,
            total_points_earned: user.total_points_earned,
            level: user.level,
            streak_days: user.streak_days,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse::from(&user)
    }
}

/// DTO for creating a new user. The password is already hashed.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(email)]
    pub email: String,
    pub password_hash: String,
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    pub role: String,
}

/// Request body for a manual point award or deduction.
#[derive(Debug, Clone, Deserialize)]
pub struct AwardPointsRequest {
    /// Positive to award, negative to deduct.
    pub amount: Points,
    pub description: String,
}
