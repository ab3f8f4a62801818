//! Repository for the append-only `point_transactions` table.
//!
//! There are deliberately no update or delete methods here.

use quest_core::types::DbId;
use sqlx::PgPool;

use super::PgTx;
use crate::models::transaction::{NewPointTransaction, PointTransaction};

const COLUMNS: &str = "id, user_id, amount, kind, description, actor_id, created_at";

pub struct TransactionRepo;

impl TransactionRepo {
    /// Append one entry inside the ledger transaction that caused it.
    pub async fn append(
        tx: &mut PgTx<'_>,
        entry: &NewPointTransaction,
    ) -> Result<PointTransaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO point_transactions (user_id, amount, kind, description, actor_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PointTransaction>(&query)
            .bind(entry.user_id)
            .bind(entry.amount)
            .bind(entry.kind.as_str())
            .bind(&entry.description)
            .bind(entry.actor_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Most recent entries for a user, newest first, capped at `limit`.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<PointTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM point_transactions \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, PointTransaction>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Total number of entries for a user.
    pub async fn count_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM point_transactions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }
}
