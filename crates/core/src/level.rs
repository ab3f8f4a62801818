//! Level derivation from lifetime earnings.
//!
//! A level is never stored independently: it is always
//! `floor(total_points_earned / 100) + 1`, and never below 1. The
//! PostgreSQL schema mirrors this as a generated column.

use crate::types::Points;

/// Lifetime points needed per level.
pub const POINTS_PER_LEVEL: Points = 100;

/// The lowest level a user can hold.
pub const MIN_LEVEL: i32 = 1;

/// Compute the level for a lifetime earnings total.
///
/// Negative totals cannot occur under the earnings policy below, but are
/// clamped to level 1 regardless.
pub fn level_for(total_points_earned: Points) -> i32 {
    checked_level_for(total_points_earned).unwrap_or(i32::MAX)
}

/// Like [`level_for`], but `None` when the level does not fit the
/// `INTEGER` column it is stored in.
pub fn checked_level_for(total_points_earned: Points) -> Option<i32> {
    if total_points_earned <= 0 {
        return Some(MIN_LEVEL);
    }
    i32::try_from(total_points_earned / POINTS_PER_LEVEL + 1).ok()
}

/// How much a signed award adds to lifetime earnings.
///
/// Only positive awards count; deductions lower the spendable balance but
/// leave lifetime earnings (and therefore level) untouched.
pub fn earned_delta(amount: Points) -> Points {
    amount.max(0)
}
