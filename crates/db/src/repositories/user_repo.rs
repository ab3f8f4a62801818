//! Repository for the `users` table.

use quest_core::roles::ROLE_EMPLOYEE;
use quest_core::types::{DbId, Points};
use sqlx::PgPool;

use super::PgTx;
use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, full_name, role, points, \
                       total_points_earned, level, streak_days, created_at, updated_at";

/// Provides CRUD and balance operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, password_hash, full_name, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.full_name)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List all employees, highest balance first.
    pub async fn list_employees(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE role = $1 ORDER BY points DESC, id ASC"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(ROLE_EMPLOYEE)
            .fetch_all(pool)
            .await
    }

    /// Hard-delete a user. Unlocks, redemptions and transactions cascade.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Ledger mutations (transaction-scoped)
    // -----------------------------------------------------------------------

    /// Lock a user row for the remainder of the transaction.
    pub async fn lock_for_update(tx: &mut PgTx<'_>, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Apply a balance change and a lifetime-earnings change in one statement.
    ///
    /// `level` is a generated column and follows `total_points_earned`.
    pub async fn apply_points(
        tx: &mut PgTx<'_>,
        id: DbId,
        points_delta: Points,
        earned_delta: Points,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "UPDATE users SET \
                 points = points + $2, \
                 total_points_earned = total_points_earned + $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(points_delta)
            .bind(earned_delta)
            .fetch_one(&mut **tx)
            .await
    }

    /// Deduct `cost` only if the balance covers it.
    ///
    /// Returns `None` when the balance is insufficient, leaving the row
    /// untouched.
    pub async fn spend_points(
        tx: &mut PgTx<'_>,
        id: DbId,
        cost: Points,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET points = points - $2 \
             WHERE id = $1 AND points >= $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(cost)
            .fetch_optional(&mut **tx)
            .await
    }
}
