use quest_core::error::CoreError;

use crate::rules::points_out_of_range;

/// SQLSTATE `numeric_value_out_of_range`.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Errors returned by ledger operations.
///
/// [`LedgerError::Core`] is a declined operation (nothing was written);
/// [`LedgerError::Storage`] means the backing store failed and the caller
/// may retry later.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Storage unavailable: {0}")]
    Storage(sqlx::Error),
}

impl From<sqlx::Error> for LedgerError {
    /// Numeric overflow in a balance update becomes a Validation decline.
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE) {
                return LedgerError::Core(points_out_of_range());
            }
        }
        LedgerError::Storage(err)
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    /// `true` for domain validation failures, `false` for storage failures.
    pub fn is_declined(&self) -> bool {
        match self {
            LedgerError::Core(core) => core.is_declined(),
            LedgerError::Storage(_) => false,
        }
    }

    /// Collapse into the shared domain taxonomy.
    pub fn into_core(self) -> CoreError {
        match self {
            LedgerError::Core(core) => core,
            LedgerError::Storage(err) => CoreError::StorageUnavailable(err.to_string()),
        }
    }
}
