//! Handlers for user administration and per-user ledger views.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use quest_core::types::DbId;
use quest_db::models::achievement::UnlockedAchievement;
use quest_db::models::transaction::{PointTransaction, TransactionHistoryParams};
use quest_db::models::user::{AwardPointsRequest, UserResponse};
use quest_db::repositories::UserRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Balance and log entry after a manual award.
#[derive(Debug, Serialize)]
pub struct AwardResponse {
    pub user: UserResponse,
    pub transaction: PointTransaction,
}

/// GET /api/v1/admin/users
///
/// Employees, highest balance first.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list_employees(&state.pool).await?;
    Ok(Json(DataResponse {
        data: users.iter().map(UserResponse::from).collect(),
    }))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = state.ledger.user(id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Removes the user with their unlocks, redemptions and transactions.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.ledger.delete_user(admin.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/users/{id}/points
///
/// Positive `amount` awards, negative deducts. Admin only.
pub async fn award_points(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<AwardPointsRequest>,
) -> AppResult<Json<DataResponse<AwardResponse>>> {
    let receipt = state
        .ledger
        .award_points(auth.actor(), id, input.amount, &input.description)
        .await?;
    Ok(Json(DataResponse {
        data: AwardResponse {
            user: UserResponse::from(receipt.user),
            transaction: receipt.transaction,
        },
    }))
}

/// GET /api/v1/users/{id}/transactions
///
/// Newest first. Users see their own history; admins see anyone's.
pub async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<TransactionHistoryParams>,
) -> AppResult<Json<DataResponse<Vec<PointTransaction>>>> {
    let transactions = state
        .ledger
        .transactions(auth.actor(), id, params.limit)
        .await?;
    Ok(Json(DataResponse { data: transactions }))
}

/// GET /api/v1/users/{id}/achievements
pub async fn list_unlocks(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<UnlockedAchievement>>>> {
    let unlocks = state.ledger.unlocks(id).await?;
    Ok(Json(DataResponse { data: unlocks }))
}
