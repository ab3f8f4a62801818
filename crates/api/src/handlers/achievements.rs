//! Handlers for the `/achievements` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use quest_core::types::DbId;
use quest_db::models::achievement::{Achievement, AwardAchievementRequest, CreateAchievement};
use quest_db::models::transaction::PointTransaction;
use quest_db::models::user::UserResponse;
use quest_ledger::AchievementGrant;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Outcome of `POST /achievements/{id}/award`.
///
/// `status` is `unlocked`, `already_unlocked` or `skipped`; only an unlock
/// carries the updated user and its log entry.
#[derive(Debug, Serialize)]
pub struct GrantResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<PointTransaction>,
}

impl From<AchievementGrant> for GrantResponse {
    fn from(grant: AchievementGrant) -> Self {
        match grant {
            AchievementGrant::Unlocked(receipt) => Self {
                status: "unlocked",
                user: Some(UserResponse::from(&receipt.user)),
                transaction: Some(receipt.transaction),
            },
            AchievementGrant::AlreadyUnlocked => Self {
                status: "already_unlocked",
                user: None,
                transaction: None,
            },
            AchievementGrant::Skipped => Self {
                status: "skipped",
                user: None,
                transaction: None,
            },
        }
    }
}

/// GET /api/v1/achievements
pub async fn list_achievements(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<Achievement>>>> {
    let achievements = state
        .ledger
        .achievements(auth.actor(), params.include_inactive)
        .await?;
    Ok(Json(DataResponse { data: achievements }))
}

/// POST /api/v1/achievements
pub async fn create_achievement(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateAchievement>,
) -> AppResult<(StatusCode, Json<DataResponse<Achievement>>)> {
    let achievement = state.ledger.create_achievement(admin.actor(), &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: achievement }),
    ))
}

/// DELETE /api/v1/achievements/{id}
///
/// Soft delete; users keep achievements they already unlocked.
pub async fn delete_achievement(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.ledger.delete_achievement(admin.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/achievements/{id}/award
pub async fn award_achievement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<AwardAchievementRequest>,
) -> AppResult<Json<DataResponse<GrantResponse>>> {
    let grant = state
        .ledger
        .award_achievement(auth.actor(), input.user_id, id)
        .await?;
    Ok(Json(DataResponse {
        data: GrantResponse::from(grant),
    }))
}
