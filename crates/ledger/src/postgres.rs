//! PostgreSQL-backed [`LedgerStore`].
//!
//! Every mutation runs inside one SQL transaction. Rows are locked in a
//! fixed order (user, then reward or redemption) with `SELECT ... FOR
//! UPDATE`, and the writes themselves are conditional (`stock > 0`,
//! `points >= cost`), so two concurrent redemptions of the last unit cannot
//! both succeed. Returning early drops the transaction, which rolls back.

use async_trait::async_trait;
use quest_core::error::CoreError;
use quest_core::redemption::RedemptionStatus;
use quest_core::types::{DbId, Points};
use quest_db::models::achievement::{Achievement, CreateAchievement, UnlockedAchievement};
use quest_db::models::leaderboard::LeaderboardEntry;
use quest_db::models::redemption::RewardRedemption;
use quest_db::models::reward::{CreateReward, Reward};
use quest_db::models::transaction::PointTransaction;
use quest_db::models::user::User;
use quest_db::repositories::{
    AchievementRepo, LeaderboardRepo, RedemptionRepo, RewardRepo, TransactionRepo, UserRepo,
};
use quest_db::DbPool;

use crate::error::LedgerResult;
use crate::rules;
use crate::store::{AchievementGrant, AwardReceipt, LedgerStore, RedemptionReceipt, UnlockReceipt};

#[derive(Clone)]
pub struct PgLedgerStore {
    pool: DbPool,
}

impl PgLedgerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn user_not_found(id: DbId) -> CoreError {
    CoreError::NotFound { entity: "User", id }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn apply_award(
        &self,
        user_id: DbId,
        amount: Points,
        description: &str,
        actor_id: Option<DbId>,
    ) -> LedgerResult<AwardReceipt> {
        let mut tx = self.pool.begin().await?;

        UserRepo::lock_for_update(&mut tx, user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))?;

        let delta = rules::award_delta(amount);
        let user = UserRepo::apply_points(&mut tx, user_id, delta.points, delta.earned).await?;
        let entry = rules::admin_award_entry(user_id, amount, description, actor_id);
        let transaction = TransactionRepo::append(&mut tx, &entry).await?;

        tx.commit().await?;
        Ok(AwardReceipt { user, transaction })
    }

    async fn grant_achievement(
        &self,
        user_id: DbId,
        achievement_id: DbId,
        awarded_by: Option<DbId>,
    ) -> LedgerResult<AchievementGrant> {
        let mut tx = self.pool.begin().await?;

        UserRepo::lock_for_update(&mut tx, user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))?;

        let achievement = match AchievementRepo::find_in_tx(&mut tx, achievement_id).await? {
            Some(a) if a.is_active => a,
            _ => return Ok(AchievementGrant::Skipped),
        };

        let Some(unlock) =
            AchievementRepo::insert_unlock(&mut tx, user_id, achievement_id, awarded_by).await?
        else {
            return Ok(AchievementGrant::AlreadyUnlocked);
        };

        let delta = rules::award_delta(achievement.points_reward);
        let user = UserRepo::apply_points(&mut tx, user_id, delta.points, delta.earned).await?;
        let entry = rules::achievement_entry(user_id, &achievement, awarded_by);
        let transaction = TransactionRepo::append(&mut tx, &entry).await?;

        tx.commit().await?;
        Ok(AchievementGrant::Unlocked(Box::new(UnlockReceipt {
            unlock,
            achievement,
            user,
            transaction,
        })))
    }

    async fn redeem(&self, user_id: DbId, reward_id: DbId) -> LedgerResult<RedemptionReceipt> {
        let mut tx = self.pool.begin().await?;

        let user = UserRepo::lock_for_update(&mut tx, user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))?;
        let reward = RewardRepo::lock_for_update(&mut tx, reward_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Reward",
                id: reward_id,
            })?;

        rules::check_redemption(&user, &reward)?;

        // Both rows are locked, so these conditional writes cannot miss; the
        // conditions still guard against a store-level invariant slip.
        let reward = RewardRepo::take_one(&mut tx, reward_id)
            .await?
            .ok_or(CoreError::OutOfStock { reward_id })?;
        let user = UserRepo::spend_points(&mut tx, user_id, reward.points_cost)
            .await?
            .ok_or(CoreError::InsufficientBalance {
                required: reward.points_cost,
                available: user.points,
            })?;

        let redemption =
            RedemptionRepo::create(&mut tx, user_id, reward_id, reward.points_cost).await?;
        let transaction =
            TransactionRepo::append(&mut tx, &rules::redemption_entry(user_id, &reward)).await?;

        tx.commit().await?;
        Ok(RedemptionReceipt {
            redemption,
            reward,
            user,
            transaction,
        })
    }

    async fn transition_redemption(
        &self,
        redemption_id: DbId,
        status: RedemptionStatus,
        notes: Option<&str>,
        actor_id: Option<DbId>,
    ) -> LedgerResult<RewardRedemption> {
        let mut tx = self.pool.begin().await?;

        let current = RedemptionRepo::lock_for_update(&mut tx, redemption_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "RewardRedemption",
                id: redemption_id,
            })?;
        current.status()?.transition_to(status)?;

        let updated =
            RedemptionRepo::set_status(&mut tx, redemption_id, status, notes, actor_id).await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn create_achievement(&self, input: &CreateAchievement) -> LedgerResult<Achievement> {
        Ok(AchievementRepo::create(&self.pool, input).await?)
    }

    async fn deactivate_achievement(&self, id: DbId) -> LedgerResult<Option<Achievement>> {
        Ok(AchievementRepo::deactivate(&self.pool, id).await?)
    }

    async fn create_reward(&self, input: &CreateReward) -> LedgerResult<Reward> {
        Ok(RewardRepo::create(&self.pool, input).await?)
    }

    async fn deactivate_reward(&self, id: DbId) -> LedgerResult<Option<Reward>> {
        Ok(RewardRepo::deactivate(&self.pool, id).await?)
    }

    async fn set_reward_stock(&self, id: DbId, stock: i32) -> LedgerResult<Option<Reward>> {
        Ok(RewardRepo::set_stock(&self.pool, id, stock).await?)
    }

    async fn delete_user(&self, id: DbId) -> LedgerResult<bool> {
        Ok(UserRepo::delete(&self.pool, id).await?)
    }

    async fn find_user(&self, id: DbId) -> LedgerResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_achievements(&self, include_inactive: bool) -> LedgerResult<Vec<Achievement>> {
        Ok(AchievementRepo::list(&self.pool, include_inactive).await?)
    }

    async fn list_rewards(&self, include_inactive: bool) -> LedgerResult<Vec<Reward>> {
        Ok(RewardRepo::list(&self.pool, include_inactive).await?)
    }

    async fn list_unlocks(&self, user_id: DbId) -> LedgerResult<Vec<UnlockedAchievement>> {
        Ok(AchievementRepo::list_unlocks_for_user(&self.pool, user_id).await?)
    }

    async fn list_user_redemptions(&self, user_id: DbId) -> LedgerResult<Vec<RewardRedemption>> {
        Ok(RedemptionRepo::list_for_user(&self.pool, user_id).await?)
    }

    async fn list_redemptions(
        &self,
        status: Option<RedemptionStatus>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> LedgerResult<Vec<RewardRedemption>> {
        Ok(RedemptionRepo::list(&self.pool, status, limit, offset).await?)
    }

    async fn recent_transactions(
        &self,
        user_id: DbId,
        limit: i64,
    ) -> LedgerResult<Vec<PointTransaction>> {
        Ok(TransactionRepo::list_for_user(&self.pool, user_id, limit).await?)
    }

    async fn leaderboard(&self, limit: i64) -> LedgerResult<Vec<LeaderboardEntry>> {
        Ok(LeaderboardRepo::top(&self.pool, limit).await?)
    }
}
