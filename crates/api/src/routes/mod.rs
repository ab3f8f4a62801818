pub mod achievements;
pub mod admin;
pub mod auth;
pub mod health;
pub mod leaderboard;
pub mod redemptions;
pub mod rewards;
pub mod users;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                                   WebSocket (optional ?token=)
///
/// /auth/register                        register (public)
/// /auth/login                           login (public)
/// /auth/me                              current user
///
/// /admin/users                          list employees (admin)
/// /admin/users/{id}                     get, delete (admin)
/// /admin/redemptions                    list, ?status= filter (admin)
/// /admin/redemptions/{id}/status        move a redemption forward (admin)
///
/// /users/{id}/points                    award or deduct (admin)
/// /users/{id}/transactions              history (self or admin)
/// /users/{id}/achievements              unlocked achievements
///
/// /achievements                         list, create
/// /achievements/{id}                    soft delete (admin)
/// /achievements/{id}/award              grant to a user (admin)
///
/// /rewards                              list, create
/// /rewards/{id}                         soft delete (admin)
/// /rewards/{id}/stock                   set stock (admin)
/// /rewards/{id}/redeem                  spend own points
///
/// /redemptions                          own redemptions
/// /leaderboard                          top employees
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/users", users::router())
        .nest("/achievements", achievements::router())
        .nest("/rewards", rewards::router())
        .nest("/redemptions", redemptions::router())
        .nest("/leaderboard", leaderboard::router())
}
