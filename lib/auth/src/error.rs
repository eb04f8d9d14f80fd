//! Error types for the auth crate.
//!
//! - `AuthError`: failures of token issuance, verification and the user
//!   lookups behind login, refresh and profile.
//! - `ConfigError`: an [`AuthConfig`](crate::config::AuthConfig) that
//!   violates its invariants.
//!
//! The token failure kinds stay distinct for diagnostics. Callers facing
//! end users should collapse every [`AuthError::is_authentication_failure`]
//! case into one message.

use guestgate_core::UserId;
use std::fmt;

use crate::claims::TokenType;

/// Errors from authentication operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Token construction failed. Internal, not caused by the caller.
    Encoding { reason: String },
    /// Token is malformed or was not signed with our secret.
    InvalidSignature { reason: String },
    /// Token signature is valid but the token has expired.
    Expired,
    /// A token of the other kind was presented.
    WrongTokenType {
        expected: TokenType,
        actual: TokenType,
    },
    /// No user exists for the ID.
    NotFound { user_id: UserId },
    /// The identity store failed or rejected a write.
    Persistence { details: String },
}

impl AuthError {
    /// Returns true for failures caused by the presented credential.
    ///
    /// These are never retried and map to "unauthorized" at the edge.
    /// `NotFound` is included: during refresh a missing user breaks the
    /// credential's trust chain.
    #[must_use]
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature { .. }
                | Self::Expired
                | Self::WrongTokenType { .. }
                | Self::NotFound { .. }
        )
    }

    /// Returns true for internal failures the caller may retry.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Encoding { .. } | Self::Persistence { .. })
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoding { reason } => {
                write!(f, "failed to encode token: {reason}")
            }
            Self::InvalidSignature { reason } => {
                write!(f, "invalid token: {reason}")
            }
            Self::Expired => {
                write!(f, "token has expired")
            }
            Self::WrongTokenType { expected, actual } => {
                write!(f, "expected {expected} token, got {actual} token")
            }
            Self::NotFound { user_id } => {
                write!(f, "user not found: {user_id}")
            }
            Self::Persistence { details } => {
                write!(f, "identity store error: {details}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// Errors from validating an auth configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The signing secret is empty.
    EmptySecret,
    /// A token lifetime is zero or negative.
    NonPositiveLifetime { field: &'static str, seconds: i64 },
    /// A token lifetime exceeds the accepted maximum.
    LifetimeTooLong {
        field: &'static str,
        seconds: i64,
        max: i64,
    },
    /// The guest number range is inverted.
    InvalidGuestRange { min: u32, max: u32 },
    /// The table name is not a plain SQL identifier.
    InvalidTableName { name: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySecret => write!(f, "signing secret must not be empty"),
            Self::NonPositiveLifetime { field, seconds } => {
                write!(f, "{field} must be positive, got {seconds}")
            }
            Self::LifetimeTooLong {
                field,
                seconds,
                max,
            } => {
                write!(f, "{field} must be at most {max}, got {seconds}")
            }
            Self::InvalidGuestRange { min, max } => {
                write!(f, "guest id range is empty: min {min} > max {max}")
            }
            Self::InvalidTableName { name } => {
                write!(f, "invalid table name '{name}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
