//! Centralized server configuration.
//!
//! Loaded via the `config` crate from environment variables. Nested keys use
//! `__` as separator, so `AUTH__SIGNING_SECRET` sets `auth.signing_secret`.
//!
//! See [`AuthConfig`] for token and guest settings.

use guestgate_auth::AuthConfig;
use serde::Deserialize;
use std::fmt;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// PostgreSQL database connection URL.
    pub database_url: String,

    /// Address the HTTP listener binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Path prefix the auth routes are mounted under.
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Maximum size of the database connection pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Token and guest configuration.
    pub auth: AuthConfig,
}

fn default_bind_address() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_base_path() -> String {
    "/api/v1/auth".to_string()
}

fn default_max_connections() -> u32 {
    5
}

/// Errors from loading the server configuration.
#[derive(Debug)]
pub enum ServerConfigError {
    /// A value is missing or has the wrong type.
    Load(config::ConfigError),
    /// The auth section is present but violates an invariant.
    InvalidAuth(guestgate_auth::ConfigError),
}

impl fmt::Display for ServerConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(e) => write!(f, "failed to load configuration: {e}"),
            Self::InvalidAuth(e) => write!(f, "invalid auth configuration: {e}"),
        }
    }
}

impl std::error::Error for ServerConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
            Self::InvalidAuth(e) => Some(e),
        }
    }
}

impl From<config::ConfigError> for ServerConfigError {
    fn from(e: config::ConfigError) -> Self {
        Self::Load(e)
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, ServerConfigError> {
        let source = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Self::from_config(source)
    }

    /// Deserializes and validates an already assembled configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_config(source: config::Config) -> Result<Self, ServerConfigError> {
        let config: Self = source.try_deserialize()?;
        config
            .auth
            .validate()
            .map_err(ServerConfigError::InvalidAuth)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> config::ConfigBuilder<config::builder::DefaultState> {
        config::Config::builder()
            .set_override("database_url", "postgres://localhost/guestgate")
            .expect("override")
            .set_override("auth.signing_secret", "secret")
            .expect("override")
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = ServerConfig::from_config(builder().build().expect("build")).expect("load");

        assert_eq!(config.database_url, "postgres://localhost/guestgate");
        assert_eq!(config.bind_address, "127.0.0.1:3000");
        assert_eq!(config.base_path, "/api/v1/auth");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.auth.signing_secret(), "secret");
        assert_eq!(config.auth.table_name(), "outcome_user");
    }

    #[test]
    fn overrides_are_applied() {
        let source = builder()
            .set_override("base_path", "/auth")
            .expect("override")
            .set_override("auth.guest_id_min", 10)
            .expect("override")
            .set_override("auth.guest_id_max", 20)
            .expect("override")
            .build()
            .expect("build");

        let config = ServerConfig::from_config(source).expect("load");

        assert_eq!(config.base_path, "/auth");
        assert_eq!(config.auth.guest_id_min(), 10);
        assert_eq!(config.auth.guest_id_max(), 20);
    }

    #[test]
    fn missing_secret_fails_to_load() {
        let source = config::Config::builder()
            .set_override("database_url", "postgres://localhost/guestgate")
            .expect("override")
            .build()
            .expect("build");

        let err = ServerConfig::from_config(source).unwrap_err();
        assert!(matches!(err, ServerConfigError::Load(_)));
    }

    #[test]
    fn invalid_auth_section_is_rejected() {
        let source = builder()
            .set_override("auth.guest_id_min", 9)
            .expect("override")
            .set_override("auth.guest_id_max", 3)
            .expect("override")
            .build()
            .expect("build");

        let err = ServerConfig::from_config(source).unwrap_err();
        assert!(matches!(
            err,
            ServerConfigError::InvalidAuth(guestgate_auth::ConfigError::InvalidGuestRange {
                min: 9,
                max: 3
            })
        ));
    }
}
