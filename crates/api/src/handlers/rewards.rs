//! Handlers for the `/rewards` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use quest_core::types::DbId;
use quest_db::models::redemption::RewardRedemption;
use quest_db::models::reward::{CreateReward, RestockReward, Reward};
use quest_db::models::transaction::PointTransaction;
use quest_db::models::user::UserResponse;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Everything a successful redemption changed.
#[derive(Debug, Serialize)]
pub struct RedeemResponse {
    pub user: UserResponse,
    pub reward: Reward,
    pub redemption: RewardRedemption,
    pub transaction: PointTransaction,
}

/// GET /api/v1/rewards
///
/// Cheapest first.
pub async fn list_rewards(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<Reward>>>> {
    let rewards = state
        .ledger
        .rewards(auth.actor(), params.include_inactive)
        .await?;
    Ok(Json(DataResponse { data: rewards }))
}

/// POST /api/v1/rewards
pub async fn create_reward(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateReward>,
) -> AppResult<(StatusCode, Json<DataResponse<Reward>>)> {
    let reward = state.ledger.create_reward(admin.actor(), &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: reward })))
}

/// DELETE /api/v1/rewards/{id}
pub async fn delete_reward(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.ledger.delete_reward(admin.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/rewards/{id}/stock
pub async fn restock_reward(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<RestockReward>,
) -> AppResult<Json<DataResponse<Reward>>> {
    let reward = state
        .ledger
        .restock_reward(admin.actor(), id, input.stock)
        .await?;
    Ok(Json(DataResponse { data: reward }))
}

/// POST /api/v1/rewards/{id}/redeem
///
/// Spends the caller's own points. 422 when the balance is short, 409 when
/// the reward has no stock left.
pub async fn redeem_reward(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<RedeemResponse>>)> {
    let receipt = state
        .ledger
        .redeem_reward(auth.actor(), auth.user_id, id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RedeemResponse {
                user: UserResponse::from(receipt.user),
                reward: receipt.reward,
                redemption: receipt.redemption,
                transaction: receipt.transaction,
            },
        }),
    ))
}
