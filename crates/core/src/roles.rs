//! Well-known role name constants.
//!
//! These must match the `CHECK` constraint on `users.role` in the initial
//! migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EMPLOYEE: &str = "employee";

/// All roles a user row may carry.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_EMPLOYEE];

/// Whether the given role name grants admin-only mutations.
pub fn is_admin(role: &str) -> bool {
    role == ROLE_ADMIN
}
