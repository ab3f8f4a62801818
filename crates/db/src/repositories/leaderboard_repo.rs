//! Leaderboard query over `users`.

use quest_core::roles::ROLE_ADMIN;
use sqlx::PgPool;

use crate::models::leaderboard::LeaderboardEntry;

pub struct LeaderboardRepo;

impl LeaderboardRepo {
    /// Top `limit` non-admin users by lifetime earnings; ties by lowest id.
    pub async fn top(pool: &PgPool, limit: i64) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
        sqlx::query_as::<_, LeaderboardEntry>(
            "SELECT \
                 ROW_NUMBER() OVER (ORDER BY u.total_points_earned DESC, u.id ASC) AS rank, \
                 u.id, u.full_name, u.email, u.points, u.total_points_earned, u.level, \
                 u.streak_days, \
                 (SELECT COUNT(*) FROM user_achievements ua WHERE ua.user_id = u.id) \
                     AS achievement_count \
             FROM users u \
             WHERE u.role <> $1 \
             ORDER BY u.total_points_earned DESC, u.id ASC \
             LIMIT $2",
        )
        .bind(ROLE_ADMIN)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
