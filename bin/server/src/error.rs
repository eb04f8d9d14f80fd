//! HTTP error responses.
//!
//! Authentication failures are collapsed into one message so a caller cannot
//! tell a bad signature from an expired token or a deleted user.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use guestgate_auth::AuthError;
use serde::Serialize;

const INVALID_CREDENTIAL: &str = "Invalid or expired credential";

/// Errors returned by the auth endpoints.
#[derive(Debug)]
pub enum ApiError {
    /// The request body could not be parsed.
    InvalidBody { details: String },
    /// Missing, malformed, expired or otherwise unusable credential.
    Unauthorized { details: String },
    /// The requested user does not exist.
    UserNotFound,
    /// Token signing or persistence failed.
    Internal { details: String },
}

impl ApiError {
    /// Maps an error from a token-based operation (refresh, authorize).
    ///
    /// A missing user here means the credential no longer refers to anyone.
    #[must_use]
    pub fn from_credential_error(error: AuthError) -> Self {
        if error.is_authentication_failure() {
            Self::Unauthorized {
                details: error.to_string(),
            }
        } else {
            Self::Internal {
                details: error.to_string(),
            }
        }
    }

    /// Maps an error from a profile lookup.
    #[must_use]
    pub fn from_lookup_error(error: AuthError) -> Self {
        match error {
            AuthError::NotFound { .. } => Self::UserNotFound,
            other => Self::from_credential_error(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::InvalidBody { details } => {
                tracing::debug!(error = %details, "Rejected request body");
                (StatusCode::BAD_REQUEST, "Invalid request body")
            }
            Self::Unauthorized { details } => {
                tracing::debug!(error = %details, "Rejected credential");
                (StatusCode::UNAUTHORIZED, INVALID_CREDENTIAL)
            }
            Self::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
            Self::Internal { details } => {
                tracing::error!(error = %details, "Auth request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
