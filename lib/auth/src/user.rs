//! User domain type.
//!
//! A user is either a guest, created anonymously on first contact, or a
//! federated account identified by a provider id. Guests keep their
//! [`GuestId`] for life, including after being linked to a provider.

use chrono::{DateTime, Utc};
use guestgate_core::{GuestId, UserId};
use serde::{Deserialize, Serialize};

use crate::role::Role;

/// A user record as stored by an [`IdentityStore`](crate::store::IdentityStore).
///
/// `google_id` is present when the account is federated or a guest account
/// has been linked; a fresh guest never has one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable account ID. Used as the token subject.
    id: UserId,
    /// Anonymous-identity correlation ID.
    guest_id: GuestId,
    /// Federated provider account ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    google_id: Option<String>,
    /// Display name, `Guest<N>` for guests.
    display_name: String,
    role: Role,
    is_guest: bool,
    /// When the user record was created.
    created_at: DateTime<Utc>,
    /// When the user record was last updated (bumped on token refresh).
    updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new guest user with freshly generated identifiers.
    ///
    /// Both timestamps are set to `now`.
    #[must_use]
    pub fn new_guest(display_name: String, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            guest_id: GuestId::new(),
            google_id: None,
            display_name,
            role: Role::User,
            is_guest: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a user with all fields specified.
    ///
    /// Use this when reconstituting a user from storage.
    #[must_use]
    #[expect(clippy::too_many_arguments)]
    pub fn with_all_fields(
        id: UserId,
        guest_id: GuestId,
        google_id: Option<String>,
        display_name: String,
        role: Role,
        is_guest: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            guest_id,
            google_id,
            display_name,
            role,
            is_guest,
            created_at,
            updated_at,
        }
    }

    /// Returns the stable account ID.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the anonymous-identity correlation ID.
    #[must_use]
    pub fn guest_id(&self) -> GuestId {
        self.guest_id
    }

    /// Returns the federated provider ID, if the account has one.
    #[must_use]
    pub fn google_id(&self) -> Option<&str> {
        self.google_id.as_deref()
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns true for anonymous accounts.
    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.is_guest
    }

    /// Returns when the user was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the user was last updated.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns a copy of this user with `updated_at` replaced.
    ///
    /// Mirrors a successful `touch_updated_at` on the store so callers get
    /// the up-to-date record without a second read.
    #[must_use]
    pub fn touched(mut self, now: DateTime<Utc>) -> Self {
        self.updated_at = now;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn new_guest_has_guest_defaults() {
        let now = Utc::now();
        let user = User::new_guest("Guest42".to_string(), now);

        assert!(user.is_guest());
        assert_eq!(user.role(), Role::User);
        assert_eq!(user.display_name(), "Guest42");
        assert!(user.google_id().is_none());
        assert_eq!(user.created_at(), now);
        assert_eq!(user.updated_at(), now);
    }

    #[test]
    fn new_guests_get_distinct_ids() {
        let now = Utc::now();
        let a = User::new_guest("Guest1".to_string(), now);
        let b = User::new_guest("Guest1".to_string(), now);

        assert_ne!(a.id(), b.id());
        assert_ne!(a.guest_id(), b.guest_id());
    }

    #[test]
    fn with_all_fields_preserves_values() {
        let id = UserId::new();
        let guest_id = GuestId::new();
        let created = Utc::now() - Duration::days(30);
        let updated = Utc::now() - Duration::days(1);

        let user = User::with_all_fields(
            id,
            guest_id,
            Some("google-123".to_string()),
            "Alice".to_string(),
            Role::Admin,
            false,
            created,
            updated,
        );

        assert_eq!(user.id(), id);
        assert_eq!(user.guest_id(), guest_id);
        assert_eq!(user.google_id(), Some("google-123"));
        assert_eq!(user.display_name(), "Alice");
        assert_eq!(user.role(), Role::Admin);
        assert!(!user.is_guest());
        assert_eq!(user.created_at(), created);
        assert_eq!(user.updated_at(), updated);
    }

    #[test]
    fn touched_only_changes_updated_at() {
        let created = Utc::now() - Duration::hours(3);
        let user = User::new_guest("Guest7".to_string(), created);
        let later = created + Duration::hours(1);

        let touched = user.clone().touched(later);

        assert_eq!(touched.updated_at(), later);
        assert_eq!(touched.created_at(), created);
        assert_eq!(touched.id(), user.id());
    }

    #[test]
    fn guest_json_omits_google_id() {
        let user = User::new_guest("Guest5".to_string(), Utc::now());
        let json = serde_json::to_value(&user).expect("serialize");

        assert!(json.get("google_id").is_none());
        assert_eq!(json["is_guest"], true);
        assert_eq!(json["role"], "USER");
        assert_eq!(json["display_name"], "Guest5");
        assert!(json["guest_id"].is_string());
    }

    #[test]
    fn user_serialization_roundtrip() {
        let user = User::with_all_fields(
            UserId::new(),
            GuestId::new(),
            Some("google-9".to_string()),
            "Bob".to_string(),
            Role::User,
            false,
            Utc::now(),
            Utc::now(),
        );

        let json = serde_json::to_string(&user).expect("serialize");
        let parsed: User = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(user, parsed);
    }
}
