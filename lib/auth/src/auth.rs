//! Request and response types shared with the web layer.

use guestgate_core::UserId;
use serde::{Deserialize, Serialize};

use crate::user::User;

/// Token pair and user returned by guest login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// Body of a refresh request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Subject of a verified access token.
///
/// Produced by [`AuthService::authorize`](crate::service::AuthService::authorize).
/// Only the signature and expiry were checked; the user may no longer exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: UserId,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// Returns the authenticated user's ID.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
