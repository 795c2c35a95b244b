use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{require_admin, require_valid_id, require_verified, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::user::{BadgeResponse, ProfileResponse, RoleUpdate, UserResponse};
use crate::schemas::DataResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/badges/:id", patch(highlight_badge))
        .route("/:id/role", patch(update_role))
}

async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DataResponse<ProfileResponse>>, ApiError> {
    require_verified(&user)?;

    let badges = repositories::badges::list_for_user(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch badges"))?
        .into_iter()
        .map(|(badge, held)| BadgeResponse::from_db(badge, held))
        .collect();

    let totals = repositories::seeds::totals(state.db(), &user.id, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch seed totals"))?;

    Ok(Json(DataResponse::new(ProfileResponse::new(user, badges, totals))))
}

async fn highlight_badge(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<ProfileResponse>>, ApiError> {
    require_verified(&user)?;

    let badge_id: i32 =
        id.parse().map_err(|_| ApiError::BadRequest("Invalid id".to_string()))?;

    let held = repositories::badges::set_highlight(state.db(), &user.id, badge_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to highlight badge"))?;
    if !held {
        return Err(ApiError::NotFound("Badge not held.".to_string()));
    }

    let badges = repositories::badges::list_for_user(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch badges"))?
        .into_iter()
        .map(|(badge, held)| BadgeResponse::from_db(badge, held))
        .collect();

    let totals = repositories::seeds::totals(state.db(), &user.id, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch seed totals"))?;

    Ok(Json(DataResponse::new(ProfileResponse::new(user, badges, totals))))
}

async fn update_role(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<RoleUpdate>,
) -> Result<Json<DataResponse<UserResponse>>, ApiError> {
    require_admin(&caller)?;
    require_valid_id(&id)?;

    let role = UserRole::parse(&payload.role)
        .ok_or_else(|| ApiError::BadRequest(format!("{} is not a valid role", payload.role)))?;

    let updated = repositories::users::update_role(state.db(), &id, role, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update role"))?;
    if !updated {
        return Err(ApiError::NotFound("User not found.".to_string()));
    }
    tracing::info!(user_id = %id, role = role.as_str(), "Role updated");

    let user = repositories::users::find_by_id(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    Ok(Json(DataResponse::new(UserResponse::from_db(user))))
}
