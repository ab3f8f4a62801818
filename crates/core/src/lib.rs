//! Office Quest domain primitives.
//!
//! Everything in this crate is pure: no I/O, no async. The persistence,
//! event and HTTP layers all build on these types so that the rules for
//! levels, transaction kinds and redemption lifecycles live in one place.

pub mod error;
pub mod events;
pub mod leaderboard;
pub mod level;
pub mod redemption;
pub mod roles;
pub mod transaction;
pub mod types;
pub mod validation;
