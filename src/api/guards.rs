use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts, HeaderMap};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::User;
use crate::repositories;

pub(crate) struct CurrentUser(pub(crate) User);

/// Resolves the bearer credential into the active user row. Used directly by
/// handlers whose auth requirement depends on the validated query intent.
pub(crate) async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

    let claims = security::verify_token(token, state.settings())
        .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

    let user = repositories::users::find_by_id(state.db(), &claims.sub)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

    let Some(user) = user else {
        return Err(ApiError::Unauthorized("User not found"));
    };

    if !user.is_active {
        return Err(ApiError::Unauthorized("Invalid authentication credentials"));
    }

    Ok(user)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let user = authenticate(&app_state, &parts.headers).await?;
        Ok(CurrentUser(user))
    }
}

/// Student, teacher and admin count as verified; unsigned does not.
pub(crate) fn require_verified(user: &User) -> Result<(), ApiError> {
    if user.role.is_verified() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Require Verified Role!"))
    }
}

pub(crate) fn require_admin(user: &User) -> Result<(), ApiError> {
    if user.role.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Require Admin Role!"))
    }
}

/// Path ids are UUID strings. Validated after the auth/role chain and before
/// any lookup so a malformed id is a 400, never a 404.
pub(crate) fn require_valid_id(id: &str) -> Result<(), ApiError> {
    if uuid::Uuid::parse_str(id).is_ok() {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Invalid id".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_are_rejected() {
        assert!(require_valid_id("not-a-uuid").is_err());
        assert!(require_valid_id("").is_err());
        assert!(require_valid_id("2d4c9a1e-8f33-4a3b-9a6e-0d8b1c2f3a45").is_ok());
    }
}
