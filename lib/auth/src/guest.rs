//! Guest identity creation.

use chrono::Utc;
use rand::Rng;
use tracing::info;

use crate::config::AuthConfig;
use crate::error::{AuthError, ConfigError};
use crate::store::IdentityStore;
use crate::user::User;

/// Creates anonymous guest users.
///
/// Display names are `Guest<N>` with `N` drawn uniformly from an inclusive
/// range. They are not unique; collisions between guests are expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuestBootstrapper {
    min: u32,
    max: u32,
}

impl GuestBootstrapper {
    /// Creates a bootstrapper drawing display numbers from `min..=max`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGuestRange`] if `min > max`.
    pub fn new(min: u32, max: u32) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvalidGuestRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Creates a bootstrapper over the configured range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGuestRange`] if the range is inverted.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        Self::new(config.guest_id_min(), config.guest_id_max())
    }

    /// Returns a fresh `Guest<N>` display name.
    #[must_use]
    pub fn display_name(&self) -> String {
        let n = rand::rng().random_range(self.min..=self.max);
        format!("Guest{n}")
    }

    /// Creates and persists a new guest user.
    ///
    /// The write is not retried; a retry could create a second identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Persistence`] if the store rejects the user.
    pub async fn create_guest<S>(&self, store: &S) -> Result<User, AuthError>
    where
        S: IdentityStore + ?Sized,
    {
        let user = User::new_guest(self.display_name(), Utc::now());

        let created = store
            .create(&user)
            .await
            .map_err(|report| AuthError::Persistence {
                details: report.to_string(),
            })?;

        info!(
            user_id = %created.id(),
            guest_id = %created.guest_id(),
            display_name = created.display_name(),
            "Created guest user"
        );
        Ok(created)
    }
}
