//! Well-known real-time event names.
//!
//! These are the names clients subscribe to on the WebSocket channel. The
//! ledger publishes each one only after the corresponding store mutation has
//! committed.

pub const EVENT_ACHIEVEMENT_CREATED: &str = "achievementCreated";
pub const EVENT_ACHIEVEMENT_AWARDED: &str = "achievementAwarded";
pub const EVENT_ACHIEVEMENT_DELETED: &str = "achievementDeleted";
pub const EVENT_REWARD_CREATED: &str = "rewardCreated";
pub const EVENT_REWARD_PURCHASED: &str = "rewardPurchased";
pub const EVENT_REWARD_DELETED: &str = "rewardDeleted";
pub const EVENT_REWARD_RESTOCKED: &str = "rewardRestocked";
pub const EVENT_POINTS_AWARDED: &str = "pointsAwarded";
pub const EVENT_REDEMPTION_UPDATED: &str = "redemptionUpdated";
pub const EVENT_USER_DELETED: &str = "userDeleted";

/// Local-only frame sent to the subject of a ledger mutation.
pub const EVENT_CELEBRATION: &str = "celebration";

/// Events whose subject user gets a celebration frame.
pub const CELEBRATED_EVENTS: &[&str] = &[
    EVENT_POINTS_AWARDED,
    EVENT_ACHIEVEMENT_AWARDED,
    EVENT_REWARD_PURCHASED,
];

/// Celebration text for a manual award or deduction.
pub fn points_celebration(amount: i64, description: &str) -> String {
    if amount >= 0 {
        format!("+{amount} points! {description}")
    } else {
        format!("{amount} points. {description}")
    }
}

/// Celebration text for a redeemed reward.
pub fn redemption_celebration(reward_title: &str) -> String {
    format!("{reward_title} redeemed!")
}
