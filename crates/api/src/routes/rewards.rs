use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::rewards;
use crate::state::AppState;

/// Routes mounted at `/rewards`.
///
/// ```text
/// GET    /             -> list_rewards
/// POST   /             -> create_reward (admin)
/// DELETE /{id}         -> delete_reward (admin)
/// PUT    /{id}/stock   -> restock_reward (admin)
/// POST   /{id}/redeem  -> redeem_reward
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rewards::list_rewards).post(rewards::create_reward))
        .route("/{id}", delete(rewards::delete_reward))
        .route("/{id}/stock", put(rewards::restock_reward))
        .route("/{id}/redeem", post(rewards::redeem_reward))
}
