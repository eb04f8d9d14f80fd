//! Bearer token extractor for Axum.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use guestgate_auth::AuthenticatedUser;
use std::sync::Arc;

use super::AppState;
use crate::error::ApiError;

const BEARER_SCHEME: &str = "Bearer";

/// Extractor for requiring a valid access token.
///
/// Reads `Authorization: Bearer <token>` and verifies the token's signature,
/// type and expiry. The scheme name is case-insensitive. The user is not
/// loaded.
pub struct RequireAuth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let token = bearer_token(parts)?;

        let user_id = app_state
            .auth
            .authorize(token)
            .map_err(ApiError::from_credential_error)?;

        Ok(RequireAuth(AuthenticatedUser::new(user_id)))
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized {
            details: "missing authorization header".to_string(),
        })?;

    let value = header.to_str().map_err(|_| ApiError::Unauthorized {
        details: "authorization header is not ASCII".to_string(),
    })?;

    value
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case(BEARER_SCHEME))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized {
            details: "authorization header is not a bearer token".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/profile");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).expect("request").into_parts().0
    }

    #[test]
    fn extracts_bearer_token() {
        let parts = parts(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).expect("token"), "abc.def.ghi");
    }

    #[test]
    fn scheme_is_case_insensitive() {
        for value in ["bearer abc.def.ghi", "BEARER abc.def.ghi", "bEaReR  abc.def.ghi"] {
            assert_eq!(
                bearer_token(&parts(Some(value))).expect("token"),
                "abc.def.ghi",
                "{value} should be accepted"
            );
        }
    }

    #[test]
    fn missing_header_is_unauthorized() {
        assert!(matches!(
            bearer_token(&parts(None)),
            Err(ApiError::Unauthorized { .. })
        ));
    }

    #[test]
    fn other_schemes_are_unauthorized() {
        for value in [
            "Basic dXNlcjpwYXNz",
            "bearer",
            "Bearer ",
            "Bearerabc.def.ghi",
            "abc.def.ghi",
        ] {
            assert!(
                matches!(
                    bearer_token(&parts(Some(value))),
                    Err(ApiError::Unauthorized { .. })
                ),
                "{value} should be rejected"
            );
        }
    }
}
