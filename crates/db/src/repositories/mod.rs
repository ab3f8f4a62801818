//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Methods that participate in a
//! ledger mutation take `&mut Transaction` instead so the caller controls
//! commit/rollback.

pub mod achievement_repo;
pub mod leaderboard_repo;
pub mod redemption_repo;
pub mod reward_repo;
pub mod transaction_repo;
pub mod user_repo;

pub use achievement_repo::AchievementRepo;
pub use leaderboard_repo::LeaderboardRepo;
pub use redemption_repo::RedemptionRepo;
pub use reward_repo::RewardRepo;
pub use transaction_repo::TransactionRepo;
pub use user_repo::UserRepo;

/// Postgres transaction handle passed to ledger-mutation queries.
pub type PgTx<'c> = sqlx::Transaction<'c, sqlx::Postgres>;
