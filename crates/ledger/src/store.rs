//! The persistence seam of the ledger.

use async_trait::async_trait;
use quest_core::redemption::RedemptionStatus;
use quest_core::types::{DbId, Points};
use quest_db::models::achievement::{
    Achievement, CreateAchievement, UnlockedAchievement, UserAchievement,
};
use quest_db::models::leaderboard::LeaderboardEntry;
use quest_db::models::redemption::RewardRedemption;
use quest_db::models::reward::{CreateReward, Reward};
use quest_db::models::transaction::PointTransaction;
use quest_db::models::user::User;

use crate::error::LedgerResult;

/// Result of a committed point award or deduction.
#[derive(Debug, Clone)]
pub struct AwardReceipt {
    pub user: User,
    pub transaction: PointTransaction,
}

/// Everything written by a first-time achievement unlock.
#[derive(Debug, Clone)]
pub struct UnlockReceipt {
    pub unlock: UserAchievement,
    pub achievement: Achievement,
    pub user: User,
    pub transaction: PointTransaction,
}

/// Outcome of granting an achievement. Only `Unlocked` changed anything.
#[derive(Debug, Clone)]
pub enum AchievementGrant {
    Unlocked(Box<UnlockReceipt>),
    /// The user already holds this achievement.
    AlreadyUnlocked,
    /// The achievement does not exist or is inactive.
    Skipped,
}

/// Everything written by a successful redemption.
#[derive(Debug, Clone)]
pub struct RedemptionReceipt {
    pub redemption: RewardRedemption,
    pub reward: Reward,
    pub user: User,
    pub transaction: PointTransaction,
}

/// Storage for users' ledgers, the catalog, and the audit log.
///
/// Mutation methods are atomic and serialised per affected row: concurrent
/// calls touching the same user or reward observe each other's effects, so a
/// balance or stock check can never be satisfied twice by the same units.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // -- ledger mutations ---------------------------------------------------

    /// Add `amount` (signed) to a user's balance and log one `admin_award`
    /// transaction. Fails with `NotFound` for an unknown user.
    async fn apply_award(
        &self,
        user_id: DbId,
        amount: Points,
        description: &str,
        actor_id: Option<DbId>,
    ) -> LedgerResult<AwardReceipt>;

    /// Unlock an achievement at most once and credit its reward.
    async fn grant_achievement(
        &self,
        user_id: DbId,
        achievement_id: DbId,
        awarded_by: Option<DbId>,
    ) -> LedgerResult<AchievementGrant>;

    /// Spend points on one unit of a reward, creating a `pending` redemption.
    async fn redeem(&self, user_id: DbId, reward_id: DbId) -> LedgerResult<RedemptionReceipt>;

    /// Move a redemption forward in its lifecycle.
    async fn transition_redemption(
        &self,
        redemption_id: DbId,
        status: RedemptionStatus,
        notes: Option<&str>,
        actor_id: Option<DbId>,
    ) -> LedgerResult<RewardRedemption>;

    // -- catalog and users --------------------------------------------------

    async fn create_achievement(&self, input: &CreateAchievement) -> LedgerResult<Achievement>;

    /// Soft-delete. `None` if there was no active achievement with that id.
    async fn deactivate_achievement(&self, id: DbId) -> LedgerResult<Option<Achievement>>;

    async fn create_reward(&self, input: &CreateReward) -> LedgerResult<Reward>;

    /// Soft-delete. `None` if there was no active reward with that id.
    async fn deactivate_reward(&self, id: DbId) -> LedgerResult<Option<Reward>>;

    async fn set_reward_stock(&self, id: DbId, stock: i32) -> LedgerResult<Option<Reward>>;

    /// Remove a user together with their unlocks, redemptions and log.
    async fn delete_user(&self, id: DbId) -> LedgerResult<bool>;

    // -- queries ------------------------------------------------------------

    async fn find_user(&self, id: DbId) -> LedgerResult<Option<User>>;

    async fn list_achievements(&self, include_inactive: bool) -> LedgerResult<Vec<Achievement>>;

    async fn list_rewards(&self, include_inactive: bool) -> LedgerResult<Vec<Reward>>;

    async fn list_unlocks(&self, user_id: DbId) -> LedgerResult<Vec<UnlockedAchievement>>;

    async fn list_user_redemptions(&self, user_id: DbId) -> LedgerResult<Vec<RewardRedemption>>;

    async fn list_redemptions(
        &self,
        status: Option<RedemptionStatus>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> LedgerResult<Vec<RewardRedemption>>;

    /// Most recent first, at most `limit` entries.
    async fn recent_transactions(
        &self,
        user_id: DbId,
        limit: i64,
    ) -> LedgerResult<Vec<PointTransaction>>;

    /// Top `limit` non-admin users by lifetime earnings, ties by lowest id.
    async fn leaderboard(&self, limit: i64) -> LedgerResult<Vec<LeaderboardEntry>>;
}
