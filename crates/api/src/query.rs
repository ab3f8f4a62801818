//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Query parameters for catalog lists that support an `include_inactive` flag.
///
/// The flag is honoured for admins only.
#[derive(Debug, Default, Deserialize)]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: bool,
}

