//! Repository for the `rewards` table.

use quest_core::types::DbId;
use quest_core::validation::DEFAULT_REWARD_STOCK;
use sqlx::PgPool;

use super::PgTx;
use crate::models::reward::{CreateReward, Reward};

const COLUMNS: &str = "id, title, description, icon, points_cost, category, stock, image_url, \
                       is_active, created_at, updated_at";

/// Provides catalog CRUD and stock bookkeeping for rewards.
pub struct RewardRepo;

impl RewardRepo {
    /// Insert a new reward. Missing stock defaults to 999.
    pub async fn create(pool: &PgPool, input: &CreateReward) -> Result<Reward, sqlx::Error> {
        let query = format!(
            "INSERT INTO rewards (title, description, icon, points_cost, category, stock, image_url) \
             VALUES ($1, $2, COALESCE($3, 'gift'), $4, COALESCE($5, 'general'), $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reward>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.icon.as_deref())
            .bind(input.points_cost)
            .bind(input.category.as_deref())
            .bind(input.stock.unwrap_or(DEFAULT_REWARD_STOCK))
            .bind(input.image_url.as_deref())
            .fetch_one(pool)
            .await
    }

    /// List rewards, cheapest first, optionally including deactivated ones.
    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Reward>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rewards \
             WHERE is_active = true OR $1 \
             ORDER BY points_cost ASC, id ASC"
        );
        sqlx::query_as::<_, Reward>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Soft-delete a reward. Returns `None` if no active reward has that ID.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<Option<Reward>, sqlx::Error> {
        let query = format!(
            "UPDATE rewards SET is_active = false \
             WHERE id = $1 AND is_active = true \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reward>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the stock level. Returns `None` if the reward does not exist.
    pub async fn set_stock(
        pool: &PgPool,
        id: DbId,
        stock: i32,
    ) -> Result<Option<Reward>, sqlx::Error> {
        let query = format!("UPDATE rewards SET stock = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Reward>(&query)
            .bind(id)
            .bind(stock)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Ledger mutations (transaction-scoped)
    // -----------------------------------------------------------------------

    /// Lock a reward row for the remainder of the transaction.
    pub async fn lock_for_update(
        tx: &mut PgTx<'_>,
        id: DbId,
    ) -> Result<Option<Reward>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rewards WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Reward>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Take one unit of stock if any remains.
    ///
    /// Returns `None` when the reward is out of stock.
    pub async fn take_one(tx: &mut PgTx<'_>, id: DbId) -> Result<Option<Reward>, sqlx::Error> {
        let query = format!(
            "UPDATE rewards SET stock = stock - 1 \
             WHERE id = $1 AND stock > 0 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reward>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }
}
