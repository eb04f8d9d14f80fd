//! Guest login, token refresh, profile lookup and request authorization.
//!
//! [`AuthService`] composes the [`TokenCodec`], the [`GuestBootstrapper`]
//! and an [`IdentityStore`]. It holds no mutable state; one instance is
//! shared by all request handlers.
//!
//! Refresh rotates the token pair but cannot invalidate the presented
//! refresh token, so replaying it keeps working until it expires.

use chrono::{DateTime, Utc};
use guestgate_core::UserId;
use std::fmt;
use tracing::{debug, instrument, warn};

use crate::auth::LoginResponse;
use crate::config::AuthConfig;
use crate::error::{AuthError, ConfigError};
use crate::guest::GuestBootstrapper;
use crate::store::IdentityStore;
use crate::token::TokenCodec;
use crate::user::User;

/// Authentication use cases over an identity store.
#[derive(Clone)]
pub struct AuthService<S> {
    config: AuthConfig,
    codec: TokenCodec,
    guests: GuestBootstrapper,
    store: S,
}

impl<S: IdentityStore> AuthService<S> {
    /// Creates a service after validating `config`.
    ///
    /// Configurations that bypassed the builder, such as ones deserialized
    /// from the environment, are checked here as well.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found by [`AuthConfig::validate`].
    pub fn new(config: AuthConfig, store: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            codec: TokenCodec::new(config.signing_secret()),
            guests: GuestBootstrapper::from_config(&config)?,
            config,
            store,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a guest user and issues its first token pair.
    ///
    /// If issuance fails after the user was persisted, the user is left in
    /// place.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Persistence`] if the store rejects the new user
    /// - [`AuthError::Encoding`] if a token cannot be signed
    #[instrument(skip(self))]
    pub async fn guest_login(&self) -> Result<LoginResponse, AuthError> {
        let user = self.guests.create_guest(&self.store).await?;
        self.issue_pair(user, Utc::now())
    }

    /// Exchanges a refresh token for a new token pair.
    ///
    /// The user's `updated_at` is bumped on a best-effort basis: a failed
    /// write is logged and the refresh still succeeds.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidSignature`], [`AuthError::Expired`] or
    ///   [`AuthError::WrongTokenType`] if the token is not a valid refresh
    ///   token
    /// - [`AuthError::NotFound`] if the token's subject no longer exists
    /// - [`AuthError::Persistence`] if the user cannot be loaded
    /// - [`AuthError::Encoding`] if a token cannot be signed
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<LoginResponse, AuthError> {
        let now = Utc::now();
        let claims = self.codec.verify_refresh_token_at(refresh_token, now)?;
        let user_id = claims.subject();
        let user = self.load(user_id).await?;

        let user = match self.store.touch_updated_at(user_id, now).await {
            Ok(()) => user.touched(now),
            Err(report) => {
                warn!(
                    user_id = %user_id,
                    error = %report,
                    "Failed to record refresh time"
                );
                user
            }
        };

        let response = self.issue_pair(user, now)?;
        debug!(user_id = %user_id, "Refreshed token pair");
        Ok(response)
    }

    /// Loads the user with the given ID.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotFound`] if there is no such user
    /// - [`AuthError::Persistence`] if the store fails
    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: UserId) -> Result<User, AuthError> {
        self.load(user_id).await
    }

    /// Verifies an access token and returns its subject.
    ///
    /// Signature, type and expiry only; the store is not consulted.
    ///
    /// # Errors
    ///
    /// Returns the token verification error kind.
    pub fn authorize(&self, access_token: &str) -> Result<UserId, AuthError> {
        Ok(self.codec.verify_access_token(access_token)?.subject())
    }

    async fn load(&self, user_id: UserId) -> Result<User, AuthError> {
        self.store
            .find_by_id(user_id)
            .await
            .map_err(|report| AuthError::Persistence {
                details: report.to_string(),
            })?
            .ok_or(AuthError::NotFound { user_id })
    }

    fn issue_pair(&self, user: User, now: DateTime<Utc>) -> Result<LoginResponse, AuthError> {
        let access_token = self.codec.issue_access_token_at(
            user.id(),
            user.role(),
            self.config.access_token_lifetime(),
            now,
        )?;
        let refresh_token =
            self.codec
                .issue_refresh_token_at(user.id(), self.config.refresh_token_lifetime(), now)?;

        Ok(LoginResponse {
            access_token,
            refresh_token,
            user,
        })
    }
}

impl<S> fmt::Debug for AuthService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("config", &self.config)
            .field("guests", &self.guests)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::TokenType;
    use crate::memory::MemoryIdentityStore;
    use crate::role::Role;
    use chrono::Duration;
    use std::sync::Arc;

    const SECRET: &str = "service-test-secret";

    fn service() -> AuthService<Arc<MemoryIdentityStore>> {
        let config = AuthConfig::new(SECRET.to_string());
        AuthService::new(config, Arc::new(MemoryIdentityStore::new())).expect("valid config")
    }

    fn from_json(json: &str) -> Result<AuthService<MemoryIdentityStore>, ConfigError> {
        let config: AuthConfig = serde_json::from_str(json).expect("deserialize");
        AuthService::new(config, MemoryIdentityStore::new())
    }

    #[test]
    fn empty_secret_is_rejected() {
        let err = from_json(r#"{ "signing_secret": "" }"#).unwrap_err();
        assert_eq!(err, ConfigError::EmptySecret);
    }

    #[test]
    fn inverted_guest_range_is_rejected() {
        let err =
            from_json(r#"{ "signing_secret": "s", "guest_id_min": 9, "guest_id_max": 3 }"#)
                .unwrap_err();
        assert_eq!(err, ConfigError::InvalidGuestRange { min: 9, max: 3 });
    }

    #[test]
    fn non_positive_lifetime_is_rejected() {
        let err = from_json(r#"{ "signing_secret": "s", "access_token_ttl_seconds": 0 }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveLifetime { .. }));
    }

    fn stale_user() -> User {
        User::new_guest("Guest5".to_string(), Utc::now() - Duration::days(3))
    }

    #[tokio::test]
    async fn guest_login_issues_usable_tokens() {
        let service = service();

        let response = service.guest_login().await.expect("guest login");

        assert!(!response.access_token.is_empty());
        assert!(!response.refresh_token.is_empty());
        assert_ne!(response.access_token, response.refresh_token);
        assert!(response.user.is_guest());
        assert_eq!(response.user.role(), Role::User);
        assert_eq!(
            service.authorize(&response.access_token).expect("authorize"),
            response.user.id()
        );
        assert_eq!(service.store().len(), 1);
    }

    #[tokio::test]
    async fn guest_login_store_failure_is_persistence() {
        let service = service();
        service.store().fail_creates(true);

        let err = service.guest_login().await.unwrap_err();
        assert!(matches!(err, AuthError::Persistence { .. }));
        assert!(err.is_internal());
    }

    #[tokio::test]
    async fn refresh_rotates_tokens() {
        let service = service();
        let login = service.guest_login().await.expect("guest login");

        let refreshed = service.refresh(&login.refresh_token).await.expect("refresh");

        assert_ne!(refreshed.access_token, login.access_token);
        assert_ne!(refreshed.refresh_token, login.refresh_token);
        assert_eq!(refreshed.user.id(), login.user.id());
        assert_eq!(
            service.authorize(&refreshed.access_token).expect("authorize"),
            login.user.id()
        );
    }

    #[tokio::test]
    async fn refresh_bumps_updated_at() {
        let service = service();
        let user = stale_user();
        service.store().insert(user.clone());
        let token = service
            .codec
            .issue_refresh_token(user.id(), Duration::hours(1))
            .expect("issue");

        let refreshed = service.refresh(&token).await.expect("refresh");

        assert!(refreshed.user.updated_at() > user.updated_at());
        assert_eq!(refreshed.user.created_at(), user.created_at());
        assert_eq!(
            service.store().get(user.id()).expect("stored").updated_at(),
            refreshed.user.updated_at()
        );
        assert_eq!(service.store().touch_count(), 1);
    }

    #[tokio::test]
    async fn expired_refresh_token_mutates_nothing() {
        let service = service();
        let user = stale_user();
        service.store().insert(user.clone());
        let token = TokenCodec::new(SECRET)
            .issue_refresh_token_at(
                user.id(),
                Duration::hours(1),
                Utc::now() - Duration::hours(2),
            )
            .expect("issue");

        let err = service.refresh(&token).await.unwrap_err();

        assert_eq!(err, AuthError::Expired);
        assert!(err.is_authentication_failure());
        assert_eq!(service.store().touch_count(), 0);
        assert_eq!(service.store().get(user.id()), Some(user));
    }

    #[tokio::test]
    async fn access_token_cannot_refresh() {
        let service = service();
        let login = service.guest_login().await.expect("guest login");

        let err = service.refresh(&login.access_token).await.unwrap_err();

        assert_eq!(
            err,
            AuthError::WrongTokenType {
                expected: TokenType::Refresh,
                actual: TokenType::Access,
            }
        );
        assert_eq!(service.store().touch_count(), 0);
    }

    #[tokio::test]
    async fn refresh_token_signed_elsewhere_is_rejected() {
        let service = service();
        let user = stale_user();
        service.store().insert(user.clone());
        let token = TokenCodec::new("another-secret")
            .issue_refresh_token(user.id(), Duration::hours(1))
            .expect("issue");

        let err = service.refresh(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature { .. }));
    }

    #[tokio::test]
    async fn refresh_for_deleted_user_is_not_found() {
        let service = service();
        let login = service.guest_login().await.expect("guest login");
        service.store().remove(login.user.id());

        let err = service.refresh(&login.refresh_token).await.unwrap_err();

        assert_eq!(
            err,
            AuthError::NotFound {
                user_id: login.user.id()
            }
        );
        assert!(err.is_authentication_failure());
    }

    #[tokio::test]
    async fn refresh_survives_failed_touch() {
        let service = service();
        let user = stale_user();
        service.store().insert(user.clone());
        service.store().fail_touches(true);
        let token = service
            .codec
            .issue_refresh_token(user.id(), Duration::hours(1))
            .expect("issue");

        let refreshed = service.refresh(&token).await.expect("refresh");

        assert_eq!(refreshed.user, user);
        assert!(service.authorize(&refreshed.access_token).is_ok());
        assert_eq!(service.store().touch_count(), 0);
    }

    #[tokio::test]
    async fn refresh_read_failure_is_persistence() {
        let service = service();
        let login = service.guest_login().await.expect("guest login");
        service.store().fail_reads(true);

        let err = service.refresh(&login.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::Persistence { .. }));
    }

    #[tokio::test]
    async fn concurrent_replays_both_succeed() {
        let service = service();
        let login = service.guest_login().await.expect("guest login");

        let (first, second) = tokio::join!(
            service.refresh(&login.refresh_token),
            service.refresh(&login.refresh_token)
        );
        let first = first.expect("first refresh");
        let second = second.expect("second refresh");

        assert_ne!(first.refresh_token, second.refresh_token);
        assert_eq!(first.user.id(), second.user.id());
    }

    #[tokio::test]
    async fn get_profile_returns_stored_user() {
        let service = service();
        let login = service.guest_login().await.expect("guest login");

        let profile = service.get_profile(login.user.id()).await.expect("profile");
        assert_eq!(profile, login.user);
    }

    #[tokio::test]
    async fn get_profile_unknown_user_is_not_found() {
        let service = service();
        let id = UserId::new();

        let err = service.get_profile(id).await.unwrap_err();
        assert_eq!(err, AuthError::NotFound { user_id: id });
    }

    #[tokio::test]
    async fn authorize_is_repeatable_and_storeless() {
        let service = service();
        let login = service.guest_login().await.expect("guest login");
        service.store().fail_reads(true);
        service.store().remove(login.user.id());

        for _ in 0..3 {
            assert_eq!(
                service.authorize(&login.access_token).expect("authorize"),
                login.user.id()
            );
        }
    }

    #[tokio::test]
    async fn authorize_rejects_refresh_token() {
        let service = service();
        let login = service.guest_login().await.expect("guest login");

        let err = service.authorize(&login.refresh_token).unwrap_err();
        assert!(matches!(err, AuthError::WrongTokenType { .. }));
    }

    #[test]
    fn debug_hides_secret() {
        let rendered = format!("{:?}", service());
        assert!(!rendered.contains(SECRET));
    }
}
