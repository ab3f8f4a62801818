use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST /{id}/points        -> award_points (admin)
/// GET  /{id}/transactions  -> list_transactions (self or admin)
/// GET  /{id}/achievements  -> list_unlocks
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/points", post(users::award_points))
        .route("/{id}/transactions", get(users::list_transactions))
        .route("/{id}/achievements", get(users::list_unlocks))
}
