pub mod achievements;
pub mod auth;
pub mod leaderboard;
pub mod redemptions;
pub mod rewards;
pub mod users;
