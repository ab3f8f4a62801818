//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the request payloads that create or change it

pub mod achievement;
pub mod leaderboard;
pub mod redemption;
pub mod reward;
pub mod transaction;
pub mod user;
