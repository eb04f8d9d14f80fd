//! Signing and verification of access and refresh tokens.
//!
//! Tokens are HS256 JWTs signed with the shared secret. Verification is a
//! pure function of the token, the secret and the current time; nothing is
//! stored, so a [`TokenCodec`] can be shared freely across tasks.
//!
//! Verification order is fixed: signature, then token type, then expiry.
//! A correctly signed token of the wrong kind therefore fails with
//! [`AuthError::WrongTokenType`] even when it has also expired.

use chrono::{DateTime, Duration, Utc};
use guestgate_core::UserId;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use std::collections::HashSet;
use std::fmt;
use ulid::Ulid;

use crate::claims::{AccessClaims, RefreshClaims, TokenClaims, TokenType};
use crate::error::AuthError;
use crate::role::Role;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Issues and verifies tokens with a single symmetric secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Creates a codec for the given signing secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked after the token type, against an explicit clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["exp".to_string(), "sub".to_string()]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issues an access token valid for `lifetime` from now.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Encoding`] if the expiry is not representable or
    /// signing fails.
    pub fn issue_access_token(
        &self,
        subject: UserId,
        role: Role,
        lifetime: Duration,
    ) -> Result<String, AuthError> {
        self.issue_access_token_at(subject, role, lifetime, Utc::now())
    }

    /// Issues an access token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Encoding`] if the expiry is not representable or
    /// signing fails.
    pub fn issue_access_token_at(
        &self,
        subject: UserId,
        role: Role,
        lifetime: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        self.sign(&Self::claims(
            subject,
            Some(role),
            TokenType::Access,
            lifetime,
            now,
        )?)
    }

    /// Issues a refresh token valid for `lifetime` from now.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Encoding`] if the expiry is not representable or
    /// signing fails.
    pub fn issue_refresh_token(
        &self,
        subject: UserId,
        lifetime: Duration,
    ) -> Result<String, AuthError> {
        self.issue_refresh_token_at(subject, lifetime, Utc::now())
    }

    /// Issues a refresh token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Encoding`] if the expiry is not representable or
    /// signing fails.
    pub fn issue_refresh_token_at(
        &self,
        subject: UserId,
        lifetime: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        self.sign(&Self::claims(
            subject,
            None,
            TokenType::Refresh,
            lifetime,
            now,
        )?)
    }

    /// Verifies an access token against the current time.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidSignature`] if the token is malformed or signed
    ///   with another secret
    /// - [`AuthError::WrongTokenType`] if it is a refresh token
    /// - [`AuthError::Expired`] if it is past its expiry
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AuthError> {
        self.verify_access_token_at(token, Utc::now())
    }

    /// Verifies an access token against an explicit clock.
    ///
    /// # Errors
    ///
    /// See [`verify_access_token`](Self::verify_access_token).
    pub fn verify_access_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessClaims, AuthError> {
        let claims = self.verify(token, TokenType::Access, now)?;
        let role = claims.role.ok_or_else(|| AuthError::InvalidSignature {
            reason: "access token is missing the role claim".to_string(),
        })?;

        Ok(AccessClaims::new(
            claims.sub,
            role,
            timestamp(claims.iat)?,
            timestamp(claims.exp)?,
            claims.jti,
        ))
    }

    /// Verifies a refresh token against the current time.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidSignature`] if the token is malformed or signed
    ///   with another secret
    /// - [`AuthError::WrongTokenType`] if it is an access token
    /// - [`AuthError::Expired`] if it is past its expiry
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        self.verify_refresh_token_at(token, Utc::now())
    }

    /// Verifies a refresh token against an explicit clock.
    ///
    /// # Errors
    ///
    /// See [`verify_refresh_token`](Self::verify_refresh_token).
    pub fn verify_refresh_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<RefreshClaims, AuthError> {
        let claims = self.verify(token, TokenType::Refresh, now)?;

        Ok(RefreshClaims::new(
            claims.sub,
            timestamp(claims.iat)?,
            timestamp(claims.exp)?,
            claims.jti,
        ))
    }

    fn claims(
        subject: UserId,
        role: Option<Role>,
        token_type: TokenType,
        lifetime: Duration,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, AuthError> {
        let expires_at = now
            .checked_add_signed(lifetime)
            .ok_or_else(|| AuthError::Encoding {
                reason: format!(
                    "token lifetime of {}s is out of range",
                    lifetime.num_seconds()
                ),
            })?;

        Ok(TokenClaims {
            sub: subject,
            role,
            token_type,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Ulid::new().to_string(),
        })
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key).map_err(|e| {
            AuthError::Encoding {
                reason: e.to_string(),
            }
        })
    }

    fn verify(
        &self,
        token: &str,
        expected: TokenType,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, AuthError> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidSignature {
                    reason: e.to_string(),
                },
            })?
            .claims;

        if claims.token_type != expected {
            return Err(AuthError::WrongTokenType {
                expected,
                actual: claims.token_type,
            });
        }

        if now.timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .finish_non_exhaustive()
    }
}

fn timestamp(seconds: i64) -> Result<DateTime<Utc>, AuthError> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| AuthError::InvalidSignature {
        reason: format!("timestamp out of range: {seconds}"),
    })
}
