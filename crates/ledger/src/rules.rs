//! Check-then-mutate rules shared by every [`LedgerStore`](crate::LedgerStore)
//! implementation.
//!
//! Stores call these while holding their lock (row locks in PostgreSQL, the
//! state mutex in memory) so the check and the mutation see the same state.

use quest_core::error::CoreError;
use quest_core::level::earned_delta;
use quest_core::transaction::{achievement_description, redemption_description, TransactionKind};
use quest_core::types::{DbId, Points};
use quest_db::models::achievement::Achievement;
use quest_db::models::reward::Reward;
use quest_db::models::transaction::NewPointTransaction;
use quest_db::models::user::User;

/// Balance deltas produced by a signed award.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointsDelta {
    pub points: Points,
    pub earned: Points,
}

/// Deltas for a manual award/deduction or an achievement credit.
pub fn award_delta(amount: Points) -> PointsDelta {
    PointsDelta {
        points: amount,
        earned: earned_delta(amount),
    }
}

/// The decline for a balance, lifetime total or level that would leave
/// its storable range.
pub fn points_out_of_range() -> CoreError {
    CoreError::Validation("points total out of range".into())
}

/// Decide whether `user` may redeem `reward` right now.
///
/// Checks, in order: the reward is active, the balance covers the cost,
/// and at least one unit is in stock.
pub fn check_redemption(user: &User, reward: &Reward) -> Result<(), CoreError> {
    if !reward.is_active {
        return Err(CoreError::NotFound {
            entity: "Reward",
            id: reward.id,
        });
    }
    if user.points < reward.points_cost {
        return Err(CoreError::InsufficientBalance {
            required: reward.points_cost,
            available: user.points,
        });
    }
    if reward.stock <= 0 {
        return Err(CoreError::OutOfStock {
            reward_id: reward.id,
        });
    }
    Ok(())
}

pub fn admin_award_entry(
    user_id: DbId,
    amount: Points,
    description: &str,
    actor_id: Option<DbId>,
) -> NewPointTransaction {
    NewPointTransaction {
        user_id,
        amount,
        kind: TransactionKind::AdminAward,
        description: description.trim().to_string(),
        actor_id,
    }
}

pub fn achievement_entry(
    user_id: DbId,
    achievement: &Achievement,
    actor_id: Option<DbId>,
) -> NewPointTransaction {
    NewPointTransaction {
        user_id,
        amount: achievement.points_reward,
        kind: TransactionKind::Achievement,
        description: achievement_description(&achievement.title),
        actor_id,
    }
}

pub fn redemption_entry(user_id: DbId, reward: &Reward) -> NewPointTransaction {
    NewPointTransaction {
        user_id,
        amount: -reward.points_cost,
        kind: TransactionKind::Redemption,
        description: redemption_description(&reward.title),
        actor_id: Some(user_id),
    }
}
