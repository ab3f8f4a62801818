//! Startup provisioning of the first admin account.

use quest_core::error::CoreError;
use quest_core::roles::ROLE_ADMIN;
use quest_core::validation::validate_input;
use quest_db::models::user::{CreateUser, User};
use quest_db::repositories::UserRepo;
use quest_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

/// Create the configured admin unless an account with that email exists.
///
/// Returns the new user, or `None` when the email was already taken. An
/// existing account is left as it is, whatever its role.
pub async fn ensure_admin(pool: &DbPool, admin: &BootstrapAdmin) -> AppResult<Option<User>> {
    if let Some(existing) = UserRepo::find_by_email(pool, &admin.email).await? {
        if !existing.is_admin() {
            tracing::warn!(
                user_id = existing.id,
                "Bootstrap admin email belongs to a non-admin account"
            );
        }
        return Ok(None);
    }

    validate_password_strength(&admin.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create = CreateUser {
        email: admin.email.clone(),
        password_hash,
        full_name: "Administrator".to_string(),
        role: ROLE_ADMIN.to_string(),
    };
    validate_input(&create)?;

    let user = UserRepo::create(pool, &create).await?;
    tracing::info!(user_id = user.id, "Bootstrap admin created");
    Ok(Some(user))
}
