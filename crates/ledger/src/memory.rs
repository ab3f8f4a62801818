//! In-process [`LedgerStore`] for tests and database-free runs.
//!
//! All state sits behind one `tokio::sync::Mutex`. Each mutation takes the
//! lock once, runs the shared [`rules`](crate::rules) checks, and applies
//! every write before releasing it, which gives the same atomicity as the
//! PostgreSQL store's row locks.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use quest_core::error::CoreError;
use quest_core::leaderboard::rank_order;
use quest_core::level::{checked_level_for, level_for};
use quest_core::redemption::RedemptionStatus;
use quest_core::roles::is_admin;
use quest_core::types::{DbId, Points};
use quest_core::validation::DEFAULT_REWARD_STOCK;
use quest_db::models::achievement::{
    Achievement, CreateAchievement, UnlockedAchievement, UserAchievement,
};
use quest_db::models::leaderboard::LeaderboardEntry;
use quest_db::models::redemption::RewardRedemption;
use quest_db::models::reward::{CreateReward, Reward};
use quest_db::models::transaction::{NewPointTransaction, PointTransaction};
use quest_db::models::user::User;
use quest_db::repositories::redemption_repo::{DEFAULT_LIMIT, MAX_LIMIT};
use tokio::sync::Mutex;

use crate::error::LedgerResult;
use crate::rules;
use crate::store::{AchievementGrant, AwardReceipt, LedgerStore, RedemptionReceipt, UnlockReceipt};

#[derive(Default)]
struct MemoryState {
    users: HashMap<DbId, User>,
    achievements: HashMap<DbId, Achievement>,
    unlocks: Vec<UserAchievement>,
    rewards: HashMap<DbId, Reward>,
    redemptions: HashMap<DbId, RewardRedemption>,
    transactions: Vec<PointTransaction>,
    next_id: DbId,
}

impl MemoryState {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn user_mut(&mut self, id: DbId) -> Result<&mut User, CoreError> {
        self.users
            .get_mut(&id)
            .ok_or(CoreError::NotFound { entity: "User", id })
    }

    fn apply_delta(&mut self, user_id: DbId, amount: Points) -> Result<User, CoreError> {
        let delta = rules::award_delta(amount);
        let user = self.user_mut(user_id)?;
        let points = user
            .points
            .checked_add(delta.points)
            .ok_or_else(rules::points_out_of_range)?;
        let total_points_earned = user
            .total_points_earned
            .checked_add(delta.earned)
            .ok_or_else(rules::points_out_of_range)?;
        let level =
            checked_level_for(total_points_earned).ok_or_else(rules::points_out_of_range)?;
        user.points = points;
        user.total_points_earned = total_points_earned;
        user.level = level;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    fn append(&mut self, entry: NewPointTransaction) -> PointTransaction {
        let row = PointTransaction {
            id: self.next_id(),
            user_id: entry.user_id,
            amount: entry.amount,
            kind: entry.kind.as_str().to_string(),
            description: entry.description,
            actor_id: entry.actor_id,
            created_at: Utc::now(),
        };
        self.transactions.push(row.clone());
        row
    }
}

/// A [`LedgerStore`] held entirely in memory.
#[derive(Default)]
pub struct MemoryLedgerStore {
    state: Mutex<MemoryState>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user with an explicit balance and lifetime total.
    pub async fn insert_user(
        &self,
        email: &str,
        full_name: &str,
        role: &str,
        points: Points,
        total_points_earned: Points,
    ) -> User {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let user = User {
            id: state.next_id(),
            email: email.to_string(),
            password_hash: String::new(),
            full_name: full_name.to_string(),
            role: role.to_string(),
            points,
            total_points_earned,
            level: level_for(total_points_earned),
            streak_days: 0,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        user
    }

    /// Number of log entries for a user.
    pub async fn transaction_count(&self, user_id: DbId) -> usize {
        let state = self.state.lock().await;
        state
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .count()
    }

    /// Number of unlock rows for a (user, achievement) pair.
    pub async fn unlock_count(&self, user_id: DbId, achievement_id: DbId) -> usize {
        let state = self.state.lock().await;
        state
            .unlocks
            .iter()
            .filter(|u| u.user_id == user_id && u.achievement_id == achievement_id)
            .count()
    }

    pub async fn find_reward(&self, id: DbId) -> Option<Reward> {
        self.state.lock().await.rewards.get(&id).cloned()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn apply_award(
        &self,
        user_id: DbId,
        amount: Points,
        description: &str,
        actor_id: Option<DbId>,
    ) -> LedgerResult<AwardReceipt> {
        let mut state = self.state.lock().await;
        let user = state.apply_delta(user_id, amount)?;
        let transaction = state.append(rules::admin_award_entry(
            user_id,
            amount,
            description,
            actor_id,
        ));
        Ok(AwardReceipt { user, transaction })
    }

    async fn grant_achievement(
        &self,
        user_id: DbId,
        achievement_id: DbId,
        awarded_by: Option<DbId>,
    ) -> LedgerResult<AchievementGrant> {
        let mut state = self.state.lock().await;
        state.user_mut(user_id)?;

        let achievement = match state.achievements.get(&achievement_id) {
            Some(a) if a.is_active => a.clone(),
            _ => return Ok(AchievementGrant::Skipped),
        };
        let held = state
            .unlocks
            .iter()
            .any(|u| u.user_id == user_id && u.achievement_id == achievement_id);
        if held {
            return Ok(AchievementGrant::AlreadyUnlocked);
        }

        let unlock = UserAchievement {
            id: state.next_id(),
            user_id,
            achievement_id,
            awarded_by,
            unlocked_at: Utc::now(),
        };
        state.unlocks.push(unlock.clone());
        let user = state.apply_delta(user_id, achievement.points_reward)?;
        let transaction = state.append(rules::achievement_entry(user_id, &achievement, awarded_by));

        Ok(AchievementGrant::Unlocked(Box::new(UnlockReceipt {
            unlock,
            achievement,
            user,
            transaction,
        })))
    }

    async fn redeem(&self, user_id: DbId, reward_id: DbId) -> LedgerResult<RedemptionReceipt> {
        let mut state = self.state.lock().await;

        let user = state.user_mut(user_id)?.clone();
        let reward = state
            .rewards
            .get(&reward_id)
            .cloned()
            .ok_or(CoreError::NotFound {
                entity: "Reward",
                id: reward_id,
            })?;
        rules::check_redemption(&user, &reward)?;

        let now = Utc::now();
        let reward = {
            let row = state
                .rewards
                .get_mut(&reward_id)
                .ok_or(CoreError::OutOfStock { reward_id })?;
            row.stock -= 1;
            row.updated_at = now;
            row.clone()
        };
        let user = {
            let row = state.user_mut(user_id)?;
            row.points -= reward.points_cost;
            row.updated_at = now;
            row.clone()
        };

        let redemption = RewardRedemption {
            id: state.next_id(),
            user_id,
            reward_id,
            points_spent: reward.points_cost,
            status: RedemptionStatus::Pending.as_str().to_string(),
            notes: None,
            redeemed_at: now,
            fulfilled_at: None,
            fulfilled_by: None,
            updated_at: now,
        };
        state.redemptions.insert(redemption.id, redemption.clone());
        let transaction = state.append(rules::redemption_entry(user_id, &reward));

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
        let mut state = self.state.lock().await;
        let row = state
            .redemptions
            .get_mut(&redemption_id)
            .ok_or(CoreError::NotFound {
                entity: "RewardRedemption",
                id: redemption_id,
            })?;
        row.status()?.transition_to(status)?;

        let now = Utc::now();
        row.status = status.as_str().to_string();
        if let Some(notes) = notes {
            row.notes = Some(notes.to_string());
        }
        if status == RedemptionStatus::Fulfilled {
            row.fulfilled_at = Some(now);
            row.fulfilled_by = actor_id;
        }
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn create_achievement(&self, input: &CreateAchievement) -> LedgerResult<Achievement> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let achievement = Achievement {
            id: state.next_id(),
            title: input.title.clone(),
            description: input.description.clone(),
            icon: input.icon.clone().unwrap_or_else(|| "star".to_string()),
            points_reward: input.points_reward,
            category: input
                .category
                .clone()
                .unwrap_or_else(|| "general".to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.achievements.insert(achievement.id, achievement.clone());
        Ok(achievement)
    }

    async fn deactivate_achievement(&self, id: DbId) -> LedgerResult<Option<Achievement>> {
        let mut state = self.state.lock().await;
        Ok(state
            .achievements
            .get_mut(&id)
            .filter(|a| a.is_active)
            .map(|a| {
                a.is_active = false;
                a.updated_at = Utc::now();
                a.clone()
            }))
    }

    async fn create_reward(&self, input: &CreateReward) -> LedgerResult<Reward> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let reward = Reward {
            id: state.next_id(),
            title: input.title.clone(),
            description: input.description.clone(),
            icon: input.icon.clone().unwrap_or_else(|| "gift".to_string()),
            points_cost: input.points_cost,
            category: input
                .category
                .clone()
                .unwrap_or_else(|| "general".to_string()),
            stock: input.stock.unwrap_or(DEFAULT_REWARD_STOCK),
            image_url: input.image_url.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.rewards.insert(reward.id, reward.clone());
        Ok(reward)
    }

    async fn deactivate_reward(&self, id: DbId) -> LedgerResult<Option<Reward>> {
        let mut state = self.state.lock().await;
        Ok(state
            .rewards
            .get_mut(&id)
            .filter(|r| r.is_active)
            .map(|r| {
                r.is_active = false;
                r.updated_at = Utc::now();
                r.clone()
            }))
    }

    async fn set_reward_stock(&self, id: DbId, stock: i32) -> LedgerResult<Option<Reward>> {
        let mut state = self.state.lock().await;
        Ok(state.rewards.get_mut(&id).map(|r| {
            r.stock = stock;
            r.updated_at = Utc::now();
            r.clone()
        }))
    }

    async fn delete_user(&self, id: DbId) -> LedgerResult<bool> {
        let mut state = self.state.lock().await;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        state.unlocks.retain(|u| u.user_id != id);
        state.redemptions.retain(|_, r| r.user_id != id);
        state.transactions.retain(|t| t.user_id != id);

        for unlock in state.unlocks.iter_mut() {
            if unlock.awarded_by == Some(id) {
                unlock.awarded_by = None;
            }
        }
        for redemption in state.redemptions.values_mut() {
            if redemption.fulfilled_by == Some(id) {
                redemption.fulfilled_by = None;
            }
        }
        for entry in state.transactions.iter_mut() {
            if entry.actor_id == Some(id) {
                entry.actor_id = None;
            }
        }
        Ok(true)
    }

    async fn find_user(&self, id: DbId) -> LedgerResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn list_achievements(&self, include_inactive: bool) -> LedgerResult<Vec<Achievement>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Achievement> = state
            .achievements
            .values()
            .filter(|a| include_inactive || a.is_active)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.id);
        Ok(rows)
    }

    async fn list_rewards(&self, include_inactive: bool) -> LedgerResult<Vec<Reward>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Reward> = state
            .rewards
            .values()
            .filter(|r| include_inactive || r.is_active)
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.points_cost, r.id));
        Ok(rows)
    }

    async fn list_unlocks(&self, user_id: DbId) -> LedgerResult<Vec<UnlockedAchievement>> {
        let state = self.state.lock().await;
        let mut rows: Vec<UnlockedAchievement> = state
            .unlocks
            .iter()
            .filter(|u| u.user_id == user_id)
            .filter_map(|u| {
                state
                    .achievements
                    .get(&u.achievement_id)
                    .map(|a| UnlockedAchievement {
                        id: u.id,
                        achievement_id: a.id,
                        title: a.title.clone(),
                        description: a.description.clone(),
                        icon: a.icon.clone(),
                        points_reward: a.points_reward,
                        category: a.category.clone(),
                        awarded_by: u.awarded_by,
                        unlocked_at: u.unlocked_at,
                    })
            })
            .collect();
        rows.sort_by(|a, b| b.unlocked_at.cmp(&a.unlocked_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn list_user_redemptions(&self, user_id: DbId) -> LedgerResult<Vec<RewardRedemption>> {
        let state = self.state.lock().await;
        let mut rows: Vec<RewardRedemption> = state
            .redemptions
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.redeemed_at.cmp(&a.redeemed_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn list_redemptions(
        &self,
        status: Option<RedemptionStatus>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> LedgerResult<Vec<RewardRedemption>> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT) as usize;
        let offset = offset.unwrap_or(0).max(0) as usize;

        let state = self.state.lock().await;
        let mut rows: Vec<RewardRedemption> = state
            .redemptions
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s.as_str()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.redeemed_at.cmp(&a.redeemed_at).then(b.id.cmp(&a.id)));
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn recent_transactions(
        &self,
        user_id: DbId,
        limit: i64,
    ) -> LedgerResult<Vec<PointTransaction>> {
        let state = self.state.lock().await;
        let mut rows: Vec<PointTransaction> = state
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn leaderboard(&self, limit: i64) -> LedgerResult<Vec<LeaderboardEntry>> {
        let state = self.state.lock().await;
        let mut users: Vec<&User> = state.users.values().filter(|u| !is_admin(&u.role)).collect();
        users.sort_by(|a, b| rank_order((a.total_points_earned, a.id), (b.total_points_earned, b.id)));

        Ok(users
            .into_iter()
            .take(limit.max(0) as usize)
            .enumerate()
            .map(|(i, u)| LeaderboardEntry {
                rank: i as i64 + 1,
                id: u.id,
                full_name: u.full_name.clone(),
                email: u.email.clone(),
                points: u.points,
                total_points_earned: u.total_points_earned,
                level: u.level,
                streak_days: u.streak_days,
                achievement_count: state.unlocks.iter().filter(|a| a.user_id == u.id).count()
                    as i64,
            })
            .collect())
    }
}
