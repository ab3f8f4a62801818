//! Repository for the `achievements` and `user_achievements` tables.

use quest_core::types::DbId;
use sqlx::PgPool;

use super::PgTx;
use crate::models::achievement::{
    Achievement, CreateAchievement, UnlockedAchievement, UserAchievement,
};

const COLUMNS: &str = "id, title, description, icon, points_reward, category, is_active, \
                       created_at, updated_at";

const UNLOCK_COLUMNS: &str = "id, user_id, achievement_id, awarded_by, unlocked_at";

/// Provides achievement definitions and unlock bookkeeping.
pub struct AchievementRepo;

impl AchievementRepo {
    /// Insert a new achievement definition.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAchievement,
    ) -> Result<Achievement, sqlx::Error> {
        let query = format!(
            "INSERT INTO achievements (title, description, icon, points_reward, category) \
             VALUES ($1, $2, COALESCE($3, 'star'), $4, COALESCE($5, 'general')) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Achievement>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.icon.as_deref())
            .bind(input.points_reward)
            .bind(input.category.as_deref())
            .fetch_one(pool)
            .await
    }

    /// List achievements, optionally including deactivated ones.
    pub async fn list(
        pool: &PgPool,
        include_inactive: bool,
    ) -> Result<Vec<Achievement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM achievements \
             WHERE is_active = true OR $1 \
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, Achievement>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Soft-delete an achievement. Returns the updated row, or `None` if no
    /// active achievement has that ID.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<Option<Achievement>, sqlx::Error> {
        let query = format!(
            "UPDATE achievements SET is_active = false \
             WHERE id = $1 AND is_active = true \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Achievement>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All unlocks for a user, most recent first.
    pub async fn list_unlocks_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UnlockedAchievement>, sqlx::Error> {
        sqlx::query_as::<_, UnlockedAchievement>(
            "SELECT ua.id, ua.achievement_id, a.title, a.description, a.icon, \
                    a.points_reward, a.category, ua.awarded_by, ua.unlocked_at \
             FROM user_achievements ua \
             JOIN achievements a ON a.id = ua.achievement_id \
             WHERE ua.user_id = $1 \
             ORDER BY ua.unlocked_at DESC, ua.id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Ledger mutations (transaction-scoped)
    // -----------------------------------------------------------------------

    /// Fetch an achievement inside a ledger transaction.
    pub async fn find_in_tx(
        tx: &mut PgTx<'_>,
        id: DbId,
    ) -> Result<Option<Achievement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM achievements WHERE id = $1");
        sqlx::query_as::<_, Achievement>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Record an unlock. Returns `None` if the pair was already unlocked;
    /// the unique constraint makes this safe under concurrent grants.
    pub async fn insert_unlock(
        tx: &mut PgTx<'_>,
        user_id: DbId,
        achievement_id: DbId,
        awarded_by: Option<DbId>,
    ) -> Result<Option<UserAchievement>, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_achievements (user_id, achievement_id, awarded_by) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_user_achievements_user_achievement DO NOTHING \
             RETURNING {UNLOCK_COLUMNS}"
        );
        sqlx::query_as::<_, UserAchievement>(&query)
            .bind(user_id)
            .bind(achievement_id)
            .bind(awarded_by)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Count unlock rows for a pair (0 or 1).
    pub async fn count_unlocks(
        pool: &PgPool,
        user_id: DbId,
        achievement_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_achievements WHERE user_id = $1 AND achievement_id = $2",
        )
        .bind(user_id)
        .bind(achievement_id)
        .fetch_one(pool)
        .await
    }
}
