//! The ledger's mutation and query entry points.
//!
//! [`LedgerEngine`] enforces who may do what, validates input, delegates the
//! atomic write to a [`LedgerStore`], and publishes a [`QuestEvent`] once the
//! store reports success. A declined or failed mutation publishes nothing.

use std::sync::Arc;

use quest_core::error::CoreError;
use quest_core::events::{
    points_celebration, redemption_celebration, EVENT_ACHIEVEMENT_AWARDED,
    EVENT_ACHIEVEMENT_CREATED, EVENT_ACHIEVEMENT_DELETED, EVENT_POINTS_AWARDED,
    EVENT_REDEMPTION_UPDATED, EVENT_REWARD_CREATED, EVENT_REWARD_DELETED, EVENT_REWARD_PURCHASED,
    EVENT_REWARD_RESTOCKED, EVENT_USER_DELETED,
};
use quest_core::leaderboard::{clamp_leaderboard_limit, DEFAULT_LEADERBOARD_LIMIT};
use quest_core::redemption::RedemptionStatus;
use quest_core::transaction::clamp_history_limit;
use quest_core::types::{DbId, Points};
use quest_core::validation::{validate_award, validate_input, validate_stock};
use quest_db::models::achievement::{Achievement, CreateAchievement, UnlockedAchievement};
use quest_db::models::leaderboard::LeaderboardEntry;
use quest_db::models::redemption::RewardRedemption;
use quest_db::models::reward::{CreateReward, Reward};
use quest_db::models::transaction::PointTransaction;
use quest_db::models::user::{User, UserResponse};
use quest_events::{EventPublisher, QuestEvent};
use serde_json::json;

use crate::error::LedgerResult;
use crate::store::{AchievementGrant, AwardReceipt, LedgerStore, RedemptionReceipt};

/// The authenticated identity behind a call. Trusted as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub is_admin: bool,
}

impl Actor {
    pub fn admin(user_id: DbId) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }

    pub fn employee(user_id: DbId) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    /// Fail with `Forbidden` unless this actor is an admin.
    pub fn require_admin(&self) -> Result<(), CoreError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(CoreError::Forbidden("Admin role required".into()))
        }
    }

    /// Fail with `Forbidden` unless the actor is `user_id` or an admin.
    pub fn require_self_or_admin(&self, user_id: DbId) -> Result<(), CoreError> {
        if self.is_admin || self.user_id == user_id {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "Cannot act on another user's ledger".into(),
            ))
        }
    }
}

/// Points-and-rewards ledger over a pluggable store and event channel.
#[derive(Clone)]
pub struct LedgerEngine {
    store: Arc<dyn LedgerStore>,
    publisher: Arc<dyn EventPublisher>,
    leaderboard_limit: i64,
    history_limit: Option<i64>,
}

impl LedgerEngine {
    pub fn new(store: Arc<dyn LedgerStore>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            store,
            publisher,
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
            history_limit: None,
        }
    }

    /// Override the default number of leaderboard entries.
    pub fn with_leaderboard_limit(mut self, limit: i64) -> Self {
        self.leaderboard_limit = limit;
        self
    }

    /// Override the default transaction-history window.
    pub fn with_history_limit(mut self, limit: i64) -> Self {
        self.history_limit = Some(limit);
        self
    }

    // -----------------------------------------------------------------------
    // Ledger mutations
    // -----------------------------------------------------------------------

    /// Award (positive) or deduct (negative) points. Admin only.
    ///
    /// Deductions may take the balance below zero; they never reduce
    /// lifetime earnings or level.
    pub async fn award_points(
        &self,
        actor: Actor,
        user_id: DbId,
        amount: Points,
        description: &str,
    ) -> LedgerResult<AwardReceipt> {
        actor.require_admin()?;
        validate_award(amount, description)?;

        let receipt = self
            .store
            .apply_award(user_id, amount, description, Some(actor.user_id))
            .await?;

        tracing::info!(
            user_id,
            amount,
            actor_id = actor.user_id,
            points = receipt.user.points,
            level = receipt.user.level,
            "Points awarded",
        );
        self.publisher.publish(
            QuestEvent::new(EVENT_POINTS_AWARDED)
                .with_subject(user_id)
                .with_actor(Some(actor.user_id))
                .with_celebration(points_celebration(amount, &receipt.transaction.description))
                .with_payload(json!({
                    "user": UserResponse::from(&receipt.user),
                    "transaction": receipt.transaction,
                })),
        );
        Ok(receipt)
    }

    /// Grant an achievement. Admin only.
    ///
    /// Granting twice, or granting an unknown or inactive achievement, is a
    /// successful no-op that publishes nothing.
    pub async fn award_achievement(
        &self,
        actor: Actor,
        user_id: DbId,
        achievement_id: DbId,
    ) -> LedgerResult<AchievementGrant> {
        actor.require_admin()?;

        let grant = self
            .store
            .grant_achievement(user_id, achievement_id, Some(actor.user_id))
            .await?;

        match &grant {
            AchievementGrant::Unlocked(receipt) => {
                tracing::info!(
                    user_id,
                    achievement_id,
                    points_reward = receipt.achievement.points_reward,
                    level = receipt.user.level,
                    "Achievement unlocked",
                );
                self.publisher.publish(
                    QuestEvent::new(EVENT_ACHIEVEMENT_AWARDED)
                        .with_subject(user_id)
                        .with_actor(Some(actor.user_id))
                        .with_celebration(receipt.transaction.description.clone())
                        .with_payload(json!({
                            "user": UserResponse::from(&receipt.user),
                            "achievement": receipt.achievement,
                            "unlock": receipt.unlock,
                            "transaction": receipt.transaction,
                        })),
                );
            }
            AchievementGrant::AlreadyUnlocked => {
                tracing::debug!(user_id, achievement_id, "Achievement already unlocked");
            }
            AchievementGrant::Skipped => {
                tracing::debug!(user_id, achievement_id, "Achievement missing or inactive");
            }
        }
        Ok(grant)
    }

    /// Spend points on one unit of a reward. Users redeem for themselves;
    /// admins may redeem on anyone's behalf.
    pub async fn redeem_reward(
        &self,
        actor: Actor,
        user_id: DbId,
        reward_id: DbId,
    ) -> LedgerResult<RedemptionReceipt> {
        actor.require_self_or_admin(user_id)?;

        let receipt = match self.store.redeem(user_id, reward_id).await {
            Ok(receipt) => receipt,
            Err(err) => {
                tracing::info!(user_id, reward_id, error = %err, "Redemption declined");
                return Err(err);
            }
        };

        tracing::info!(
            user_id,
            reward_id,
            redemption_id = receipt.redemption.id,
            points_spent = receipt.redemption.points_spent,
            stock = receipt.reward.stock,
            "Reward redeemed",
        );
        self.publisher.publish(
            QuestEvent::new(EVENT_REWARD_PURCHASED)
                .with_subject(user_id)
                .with_actor(Some(actor.user_id))
                .with_celebration(redemption_celebration(&receipt.reward.title))
                .with_payload(json!({
                    "user": UserResponse::from(&receipt.user),
                    "reward": receipt.reward,
                    "redemption": receipt.redemption,
                    "transaction": receipt.transaction,
                })),
        );
        Ok(receipt)
    }

    /// Move a redemption forward. Admin only; terminal states are final.
    pub async fn update_redemption_status(
        &self,
        actor: Actor,
        redemption_id: DbId,
        status: &str,
        notes: Option<&str>,
    ) -> LedgerResult<RewardRedemption> {
        actor.require_admin()?;
        let status: RedemptionStatus = status.parse()?;

        let redemption = self
            .store
            .transition_redemption(redemption_id, status, notes, Some(actor.user_id))
            .await?;

        tracing::info!(
            redemption_id,
            status = %status,
            actor_id = actor.user_id,
            "Redemption status updated",
        );
        self.publisher.publish(
            QuestEvent::new(EVENT_REDEMPTION_UPDATED)
                .with_subject(redemption.user_id)
                .with_actor(Some(actor.user_id))
                .with_payload(json!({ "redemption": redemption })),
        );
        Ok(redemption)
    }

    // -----------------------------------------------------------------------
    // Catalog and user administration
    // -----------------------------------------------------------------------

    pub async fn create_achievement(
        &self,
        actor: Actor,
        input: &CreateAchievement,
    ) -> LedgerResult<Achievement> {
        actor.require_admin()?;
        validate_input(input)?;

        let achievement = self.store.create_achievement(input).await?;
        tracing::info!(achievement_id = achievement.id, title = %achievement.title, "Achievement created");
        self.publisher.publish(
            QuestEvent::new(EVENT_ACHIEVEMENT_CREATED)
                .with_actor(Some(actor.user_id))
                .with_payload(json!({ "achievement": achievement })),
        );
        Ok(achievement)
    }

    /// Soft-delete an achievement. Existing unlocks are kept.
    pub async fn delete_achievement(&self, actor: Actor, id: DbId) -> LedgerResult<Achievement> {
        actor.require_admin()?;

        let achievement = self
            .store
            .deactivate_achievement(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Achievement",
                id,
            })?;
        tracing::info!(achievement_id = id, "Achievement deactivated");
        self.publisher.publish(
            QuestEvent::new(EVENT_ACHIEVEMENT_DELETED)
                .with_actor(Some(actor.user_id))
                .with_payload(json!({ "achievement": achievement })),
        );
        Ok(achievement)
    }

    pub async fn create_reward(&self, actor: Actor, input: &CreateReward) -> LedgerResult<Reward> {
        actor.require_admin()?;
        validate_input(input)?;

        let reward = self.store.create_reward(input).await?;
        tracing::info!(reward_id = reward.id, title = %reward.title, stock = reward.stock, "Reward created");
        self.publisher.publish(
            QuestEvent::new(EVENT_REWARD_CREATED)
                .with_actor(Some(actor.user_id))
                .with_payload(json!({ "reward": reward })),
        );
        Ok(reward)
    }

    /// Soft-delete a reward. Existing redemptions are kept.
    pub async fn delete_reward(&self, actor: Actor, id: DbId) -> LedgerResult<Reward> {
        actor.require_admin()?;

        let reward = self
            .store
            .deactivate_reward(id)
            .await?
            .ok_or(CoreError::NotFound { entity: "Reward", id })?;
        tracing::info!(reward_id = id, "Reward deactivated");
        self.publisher.publish(
            QuestEvent::new(EVENT_REWARD_DELETED)
                .with_actor(Some(actor.user_id))
                .with_payload(json!({ "reward": reward })),
        );
        Ok(reward)
    }

    /// Set a reward's stock to an absolute value.
    pub async fn restock_reward(&self, actor: Actor, id: DbId, stock: i32) -> LedgerResult<Reward> {
        actor.require_admin()?;
        validate_stock(stock)?;

        let reward = self
            .store
            .set_reward_stock(id, stock)
            .await?
            .ok_or(CoreError::NotFound { entity: "Reward", id })?;
        tracing::info!(reward_id = id, stock, "Reward restocked");
        self.publisher.publish(
            QuestEvent::new(EVENT_REWARD_RESTOCKED)
                .with_actor(Some(actor.user_id))
                .with_payload(json!({ "reward": reward })),
        );
        Ok(reward)
    }

    /// Remove a user and everything that belongs to them. Admin only.
    pub async fn delete_user(&self, actor: Actor, id: DbId) -> LedgerResult<()> {
        actor.require_admin()?;
        if actor.user_id == id {
            return Err(CoreError::Conflict("Admins cannot delete themselves".into()).into());
        }

        if !self.store.delete_user(id).await? {
            return Err(CoreError::NotFound { entity: "User", id }.into());
        }
        tracing::info!(user_id = id, actor_id = actor.user_id, "User deleted");
        self.publisher.publish(
            QuestEvent::new(EVENT_USER_DELETED)
                .with_actor(Some(actor.user_id))
                .with_payload(json!({ "user_id": id })),
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub async fn user(&self, id: DbId) -> LedgerResult<User> {
        Ok(self
            .store
            .find_user(id)
            .await?
            .ok_or(CoreError::NotFound { entity: "User", id })?)
    }

    /// Active achievements; admins may include inactive ones.
    pub async fn achievements(
        &self,
        actor: Actor,
        include_inactive: bool,
    ) -> LedgerResult<Vec<Achievement>> {
        self.store
            .list_achievements(include_inactive && actor.is_admin)
            .await
    }

    /// Active rewards, cheapest first; admins may include inactive ones.
    pub async fn rewards(&self, actor: Actor, include_inactive: bool) -> LedgerResult<Vec<Reward>> {
        self.store
            .list_rewards(include_inactive && actor.is_admin)
            .await
    }

    pub async fn leaderboard(&self, limit: Option<i64>) -> LedgerResult<Vec<LeaderboardEntry>> {
        let limit = clamp_leaderboard_limit(limit, self.leaderboard_limit);
        self.store.leaderboard(limit).await
    }

    /// A user's most recent transactions, newest first.
    pub async fn transactions(
        &self,
        actor: Actor,
        user_id: DbId,
        limit: Option<i64>,
    ) -> LedgerResult<Vec<PointTransaction>> {
        actor.require_self_or_admin(user_id)?;
        let limit = clamp_history_limit(limit.or(self.history_limit));
        self.store.recent_transactions(user_id, limit).await
    }

    pub async fn unlocks(&self, user_id: DbId) -> LedgerResult<Vec<UnlockedAchievement>> {
        self.store.list_unlocks(user_id).await
    }

    pub async fn user_redemptions(
        &self,
        actor: Actor,
        user_id: DbId,
    ) -> LedgerResult<Vec<RewardRedemption>> {
        actor.require_self_or_admin(user_id)?;
        self.store.list_user_redemptions(user_id).await
    }

    /// All redemptions, optionally filtered by status. Admin only.
    pub async fn redemptions(
        &self,
        actor: Actor,
        status: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> LedgerResult<Vec<RewardRedemption>> {
        actor.require_admin()?;
        let status = status
            .map(str::parse::<RedemptionStatus>)
            .transpose()?;
        self.store.list_redemptions(status, limit, offset).await
    }
}
