//! Claims carried by access and refresh tokens.
//!
//! Both token kinds share one wire layout, [`TokenClaims`], distinguished by
//! the `token_type` claim. Verification hands out the typed views
//! [`AccessClaims`] and [`RefreshClaims`].

use chrono::{DateTime, Utc};
use guestgate_core::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::role::Role;

/// Kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Access => f.write_str("access"),
            Self::Refresh => f.write_str("refresh"),
        }
    }
}

/// JWT payload as signed on the wire.
///
/// ```json
/// {
///   "sub": "01J9Z3...",
///   "role": "USER",
///   "token_type": "access",
///   "iat": 1700000000,
///   "exp": 1700007200,
///   "jti": "01J9Z4..."
/// }
/// ```
///
/// `role` is only present on access tokens. `jti` is random per token, so
/// two tokens minted in the same second still differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TokenClaims {
    pub sub: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub token_type: TokenType,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// Expiration time (seconds since epoch).
    pub exp: i64,
    pub jti: String,
}

/// Verified claims of an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    subject: UserId,
    role: Role,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    token_id: String,
}

impl AccessClaims {
    pub(crate) fn new(
        subject: UserId,
        role: Role,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        token_id: String,
    ) -> Self {
        Self {
            subject,
            role,
            issued_at,
            expires_at,
            token_id,
        }
    }

    /// Returns the ID of the user the token was issued to.
    #[must_use]
    pub fn subject(&self) -> UserId {
        self.subject
    }

    /// Returns the role the user had when the token was issued.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns the unique token ID (`jti`).
    #[must_use]
    pub fn token_id(&self) -> &str {
        &self.token_id
    }
}

/// Verified claims of a refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshClaims {
    subject: UserId,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    token_id: String,
}

impl RefreshClaims {
    pub(crate) fn new(
        subject: UserId,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        token_id: String,
    ) -> Self {
        Self {
            subject,
            issued_at,
            expires_at,
            token_id,
        }
    }

    /// Returns the ID of the user the token was issued to.
    #[must_use]
    pub fn subject(&self) -> UserId {
        self.subject
    }

    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns the unique token ID (`jti`).
    #[must_use]
    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    /// Always [`TokenType::Refresh`]; verification rejects anything else.
    #[must_use]
    pub fn token_type(&self) -> TokenType {
        TokenType::Refresh
    }
}
