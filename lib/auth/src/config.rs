//! Configuration for token issuance and guest creation.
//!
//! An [`AuthConfig`] is built once at startup and handed to
//! [`AuthService::new`](crate::service::AuthService::new); it is never
//! mutated afterwards. Fields with defaults can be omitted when loading
//! from environment variables.

use chrono::Duration;
use serde::Deserialize;
use std::fmt;

use crate::error::ConfigError;

/// Longest PostgreSQL identifier.
const MAX_IDENTIFIER_LEN: usize = 63;

/// Longest accepted token lifetime: ten years.
pub const MAX_TOKEN_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// Auth configuration.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify tokens.
    signing_secret: String,
    /// Access token lifetime in seconds.
    /// Default: 7200 (2 hours)
    #[serde(default = "default_access_token_ttl_seconds")]
    access_token_ttl_seconds: i64,
    /// Refresh token lifetime in seconds.
    /// Default: 2592000 (30 days)
    #[serde(default = "default_refresh_token_ttl_seconds")]
    refresh_token_ttl_seconds: i64,
    /// Smallest number used in guest display names.
    #[serde(default = "default_guest_id_min")]
    guest_id_min: u32,
    /// Largest number used in guest display names (inclusive).
    #[serde(default = "default_guest_id_max")]
    guest_id_max: u32,
    /// Table holding user records. Trusted deployment constant, never
    /// request input.
    #[serde(default = "default_table_name")]
    table_name: String,
}

fn default_access_token_ttl_seconds() -> i64 {
    2 * 60 * 60
}

fn default_refresh_token_ttl_seconds() -> i64 {
    30 * 24 * 60 * 60
}

fn default_guest_id_min() -> u32 {
    1
}

fn default_guest_id_max() -> u32 {
    100_000
}

fn default_table_name() -> String {
    "outcome_user".to_string()
}

impl AuthConfig {
    /// Creates a configuration with defaults for everything but the secret.
    #[must_use]
    pub fn new(signing_secret: String) -> Self {
        Self {
            signing_secret,
            access_token_ttl_seconds: default_access_token_ttl_seconds(),
            refresh_token_ttl_seconds: default_refresh_token_ttl_seconds(),
            guest_id_min: default_guest_id_min(),
            guest_id_max: default_guest_id_max(),
            table_name: default_table_name(),
        }
    }

    /// Creates a configuration builder for more customization.
    #[must_use]
    pub fn builder(signing_secret: String) -> AuthConfigBuilder {
        AuthConfigBuilder::new(signing_secret)
    }

    /// Checks the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant: empty secret, lifetime outside
    /// `1..=MAX_TOKEN_TTL_SECONDS`, inverted guest range or a table name
    /// that is not a plain SQL identifier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signing_secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        validate_lifetime("access_token_ttl_seconds", self.access_token_ttl_seconds)?;
        validate_lifetime("refresh_token_ttl_seconds", self.refresh_token_ttl_seconds)?;
        if self.guest_id_min > self.guest_id_max {
            return Err(ConfigError::InvalidGuestRange {
                min: self.guest_id_min,
                max: self.guest_id_max,
            });
        }
        if !is_valid_table_name(&self.table_name) {
            return Err(ConfigError::InvalidTableName {
                name: self.table_name.clone(),
            });
        }
        Ok(())
    }

    /// Returns the token signing secret.
    #[must_use]
    pub fn signing_secret(&self) -> &str {
        &self.signing_secret
    }

    /// Returns the access token lifetime, clamped to the accepted range.
    #[must_use]
    pub fn access_token_lifetime(&self) -> Duration {
        lifetime(self.access_token_ttl_seconds)
    }

    /// Returns the refresh token lifetime, clamped to the accepted range.
    #[must_use]
    pub fn refresh_token_lifetime(&self) -> Duration {
        lifetime(self.refresh_token_ttl_seconds)
    }

    #[must_use]
    pub fn guest_id_min(&self) -> u32 {
        self.guest_id_min
    }

    #[must_use]
    pub fn guest_id_max(&self) -> u32 {
        self.guest_id_max
    }

    /// Returns the user table name, possibly schema-qualified.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_secret", &"<redacted>")
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .field("guest_id_min", &self.guest_id_min)
            .field("guest_id_max", &self.guest_id_max)
            .field("table_name", &self.table_name)
            .finish()
    }
}

fn validate_lifetime(field: &'static str, seconds: i64) -> Result<(), ConfigError> {
    if seconds <= 0 {
        return Err(ConfigError::NonPositiveLifetime { field, seconds });
    }
    if seconds > MAX_TOKEN_TTL_SECONDS {
        return Err(ConfigError::LifetimeTooLong {
            field,
            seconds,
            max: MAX_TOKEN_TTL_SECONDS,
        });
    }
    Ok(())
}

// `Duration::seconds` panics far below `i64::MAX`.
fn lifetime(seconds: i64) -> Duration {
    Duration::seconds(seconds.clamp(-MAX_TOKEN_TTL_SECONDS, MAX_TOKEN_TTL_SECONDS))
}

/// Returns true for `name` or `schema.name` made of ASCII letters, digits
/// and underscores, not starting with a digit.
#[must_use]
pub fn is_valid_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        return false;
    }
    parts.iter().all(|part| {
        let mut chars = part.chars();
        let starts_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        starts_ok
            && part.len() <= MAX_IDENTIFIER_LEN
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

/// Builder for `AuthConfig`.
#[derive(Debug)]
pub struct AuthConfigBuilder {
    config: AuthConfig,
}

impl AuthConfigBuilder {
    /// Creates a new builder with the required secret.
    #[must_use]
    pub fn new(signing_secret: String) -> Self {
        Self {
            config: AuthConfig::new(signing_secret),
        }
    }

    #[must_use]
    pub fn access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.config.access_token_ttl_seconds = lifetime.num_seconds();
        self
    }

    #[must_use]
    pub fn refresh_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.config.refresh_token_ttl_seconds = lifetime.num_seconds();
        self
    }

    /// Sets the inclusive range of guest display-name numbers.
    #[must_use]
    pub fn guest_id_range(mut self, min: u32, max: u32) -> Self {
        self.config.guest_id_min = min;
        self.config.guest_id_max = max;
        self
    }

    #[must_use]
    pub fn table_name(mut self, name: String) -> Self {
        self.config.table_name = name;
        self
    }

    /// Builds and validates the `AuthConfig`.
    ///
    /// # Errors
    ///
    /// See [`AuthConfig::validate`].
    pub fn build(self) -> Result<AuthConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
