//! The Office Quest points-and-rewards ledger.
//!
//! - [`LedgerEngine`] -- the four mutation entry points (award points, award
//!   achievement, redeem reward, update redemption status), catalog
//!   mutations, and event publication after commit.
//! - [`LedgerStore`] -- the persistence seam. Every mutation method is one
//!   atomic unit: it either applies the balance change together with its
//!   transaction-log entry or changes nothing.
//! - [`PgLedgerStore`] -- PostgreSQL, one SQL transaction with row locks per
//!   mutation.
//! - [`MemoryLedgerStore`] -- in-process state behind a single mutex, for
//!   tests and local runs without a database.

pub mod engine;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod rules;
pub mod store;

pub use engine::{Actor, LedgerEngine};
pub use error::{LedgerError, LedgerResult};
pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;
pub use store::{AchievementGrant, AwardReceipt, LedgerStore, RedemptionReceipt, UnlockReceipt};
