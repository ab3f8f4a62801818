//! Route definitions for the `/admin` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{redemptions, users};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /users                     -> list_users
/// GET    /users/{id}                -> get_user
/// DELETE /users/{id}                -> delete_user
/// GET    /redemptions               -> list_all
/// PUT    /redemptions/{id}/status   -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user).delete(users::delete_user))
        .route("/redemptions", get(redemptions::list_all))
        .route("/redemptions/{id}/status", put(redemptions::update_status))
}
