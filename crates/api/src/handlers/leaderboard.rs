use axum::extract::{Query, State};
use axum::Json;
use quest_db::models::leaderboard::{LeaderboardEntry, LeaderboardParams};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/leaderboard?limit=10
///
/// Employees ranked by lifetime points; ties go to the older account.
pub async fn leaderboard(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<LeaderboardParams>,
) -> AppResult<Json<DataResponse<Vec<LeaderboardEntry>>>> {
    let entries = state.ledger.leaderboard(params.limit).await?;
    Ok(Json(DataResponse { data: entries }))
}
