//! Repository for the `reward_redemptions` table.

use quest_core::redemption::RedemptionStatus;
use quest_core::types::{DbId, Points};
use sqlx::PgPool;

use super::PgTx;
use crate::models::redemption::RewardRedemption;

const COLUMNS: &str = "id, user_id, reward_id, points_spent, status, notes, redeemed_at, \
                       fulfilled_at, fulfilled_by, updated_at";

/// Default page size for redemption listings.
pub const DEFAULT_LIMIT: i64 = 100;

/// Maximum page size for redemption listings.
pub const MAX_LIMIT: i64 = 500;

/// Provides redemption creation, status transitions, and listings.
pub struct RedemptionRepo;

impl RedemptionRepo {
    /// A user's redemptions, most recent first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<RewardRedemption>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reward_redemptions \
             WHERE user_id = $1 \
             ORDER BY redeemed_at DESC, id DESC"
        );
        sqlx::query_as::<_, RewardRedemption>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// All redemptions, optionally filtered by status, most recent first.
    pub async fn list(
        pool: &PgPool,
        status: Option<RedemptionStatus>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<RewardRedemption>, sqlx::Error> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = offset.unwrap_or(0).max(0);
        let query = format!(
            "SELECT {COLUMNS} FROM reward_redemptions \
             WHERE ($1::TEXT IS NULL OR status = $1) \
             ORDER BY redeemed_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, RewardRedemption>(&query)
            .bind(status.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Ledger mutations (transaction-scoped)
    // -----------------------------------------------------------------------

    /// Create a `pending` redemption with a cost snapshot.
    pub async fn create(
        tx: &mut PgTx<'_>,
        user_id: DbId,
        reward_id: DbId,
        points_spent: Points,
    ) -> Result<RewardRedemption, sqlx::Error> {
        let query = format!(
            "INSERT INTO reward_redemptions (user_id, reward_id, points_spent, status) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RewardRedemption>(&query)
            .bind(user_id)
            .bind(reward_id)
            .bind(points_spent)
            .bind(RedemptionStatus::Pending.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Lock a redemption row for a status transition.
    pub async fn lock_for_update(
        tx: &mut PgTx<'_>,
        id: DbId,
    ) -> Result<Option<RewardRedemption>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reward_redemptions WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, RewardRedemption>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Write a new status. Fulfilment stamps `fulfilled_at` / `fulfilled_by`;
    /// other statuses leave them as they were.
    pub async fn set_status(
        tx: &mut PgTx<'_>,
        id: DbId,
        status: RedemptionStatus,
        notes: Option<&str>,
        actor_id: Option<DbId>,
    ) -> Result<RewardRedemption, sqlx::Error> {
        let query = format!(
            "UPDATE reward_redemptions SET \
                 status = $2, \
                 notes = COALESCE($3, notes), \
                 fulfilled_at = CASE WHEN $2 = 'fulfilled' THEN NOW() ELSE fulfilled_at END, \
                 fulfilled_by = CASE WHEN $2 = 'fulfilled' THEN $4 ELSE fulfilled_by END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RewardRedemption>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(notes)
            .bind(actor_id)
            .fetch_one(&mut **tx)
            .await
    }
}
