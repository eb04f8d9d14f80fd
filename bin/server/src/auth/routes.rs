//! Authentication routes for guest login, token refresh and profile lookup.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use guestgate_auth::{LoginResponse, RefreshTokenRequest, User};
use std::sync::Arc;

use super::{AppState, RequireAuth};
use crate::error::ApiError;

/// Creates a guest user and returns its first token pair.
pub async fn guest_login(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LoginResponse>, ApiError> {
    let response = state
        .auth
        .guest_login()
        .await
        .map_err(ApiError::from_credential_error)?;

    Ok(Json(response))
}

/// Exchanges a refresh token for a new token pair.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::InvalidBody {
        details: rejection.body_text(),
    })?;

    let response = state
        .auth
        .refresh(&request.refresh_token)
        .await
        .map_err(ApiError::from_credential_error)?;

    Ok(Json(response))
}

/// Returns the authenticated user's record.
pub async fn profile(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<User>, ApiError> {
    let user = state
        .auth
        .get_profile(user.user_id())
        .await
        .map_err(ApiError::from_lookup_error)?;

    Ok(Json(user))
}
