use axum::routing::get;
use axum::Router;

use crate::handlers::redemptions;
use crate::state::AppState;

/// Routes mounted at `/redemptions`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(redemptions::list_own))
}
