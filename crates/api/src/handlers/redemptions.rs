//! Handlers for reward redemptions.

use axum::extract::{Path, Query, State};
use axum::Json;
use quest_core::types::DbId;
use quest_db::models::redemption::{
    RedemptionListParams, RewardRedemption, UpdateRedemptionStatus,
};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/redemptions
///
/// The caller's own redemptions, newest first.
pub async fn list_own(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<RewardRedemption>>>> {
    let redemptions = state
        .ledger
        .user_redemptions(auth.actor(), auth.user_id)
        .await?;
    Ok(Json(DataResponse { data: redemptions }))
}

/// GET /api/v1/admin/redemptions?status=pending
pub async fn list_all(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(params): Query<RedemptionListParams>,
) -> AppResult<Json<DataResponse<Vec<RewardRedemption>>>> {
    let redemptions = state
        .ledger
        .redemptions(
            admin.actor(),
            params.status.as_deref(),
            params.limit,
            params.offset,
        )
        .await?;
    Ok(Json(DataResponse { data: redemptions }))
}

/// PUT /api/v1/admin/redemptions/{id}/status
///
/// Moves a redemption forward through pending, approved and fulfilled (or
/// rejected). 409 for a backwards or terminal transition.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRedemptionStatus>,
) -> AppResult<Json<DataResponse<RewardRedemption>>> {
    let redemption = state
        .ledger
        .update_redemption_status(admin.actor(), id, &input.status, input.notes.as_deref())
        .await?;
    Ok(Json(DataResponse { data: redemption }))
}
