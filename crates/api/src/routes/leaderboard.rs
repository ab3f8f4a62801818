use axum::routing::get;
use axum::Router;

use crate::handlers::leaderboard;
use crate::state::AppState;

/// Routes mounted at `/leaderboard`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(leaderboard::leaderboard))
}
