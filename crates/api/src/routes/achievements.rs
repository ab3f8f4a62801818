use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::achievements;
use crate::state::AppState;

/// Routes mounted at `/achievements`.
///
/// ```text
/// GET    /            -> list_achievements
/// POST   /            -> create_achievement (admin)
/// DELETE /{id}        -> delete_achievement (admin)
/// POST   /{id}/award  -> award_achievement (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(achievements::list_achievements).post(achievements::create_achievement),
        )
        .route("/{id}", delete(achievements::delete_achievement))
        .route("/{id}/award", post(achievements::award_achievement))
}
