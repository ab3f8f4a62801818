//! Leaderboard ordering rules.
//!
//! Non-admin users ranked by lifetime earnings, highest first. Ties are
//! broken by ascending user id so repeated queries return identical pages.

use std::cmp::Ordering;

use crate::types::{DbId, Points};

/// Default number of ranked entries.
pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 100;

/// Hard upper bound for a caller-supplied limit.
pub const MAX_LEADERBOARD_LIMIT: i64 = 500;

/// Order two `(total_points_earned, id)` pairs in leaderboard order.
pub fn rank_order(a: (Points, DbId), b: (Points, DbId)) -> Ordering {
    b.0.cmp(&a.0).then(a.1.cmp(&b.1))
}

/// Clamp a caller-supplied limit into `1..=MAX_LEADERBOARD_LIMIT`.
pub fn clamp_leaderboard_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, MAX_LEADERBOARD_LIMIT)
}
