//! Persistence contract for user records.
//!
//! The auth service only depends on this trait; the server provides a
//! PostgreSQL implementation and tests use
//! [`MemoryIdentityStore`](crate::memory::MemoryIdentityStore).
//! Implementations must be safe to call concurrently.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guestgate_core::UserId;
use std::fmt;
use std::sync::Arc;

use crate::user::User;

/// Errors from identity store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The write violated a constraint (e.g. duplicate ID).
    ConstraintViolation { details: String },
    /// The store could not be reached or the operation was aborted.
    Unavailable { details: String },
    /// A stored row could not be decoded into a [`User`].
    Corrupt { details: String },
    /// No user exists for the ID (from `touch_updated_at`).
    NotFound { user_id: UserId },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConstraintViolation { details } => {
                write!(f, "constraint violation: {details}")
            }
            Self::Unavailable { details } => write!(f, "store unavailable: {details}"),
            Self::Corrupt { details } => write!(f, "corrupt user row: {details}"),
            Self::NotFound { user_id } => write!(f, "no user with id {user_id}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Durable storage of user records.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Persists a new user and returns the stored row.
    async fn create(&self, user: &User) -> guestgate_core::Result<User, StoreError>;

    /// Loads a user by ID. Returns `Ok(None)` if there is no such user.
    async fn find_by_id(&self, id: UserId) -> guestgate_core::Result<Option<User>, StoreError>;

    /// Sets the user's `updated_at` to `now`.
    async fn touch_updated_at(
        &self,
        id: UserId,
        now: DateTime<Utc>,
    ) -> guestgate_core::Result<(), StoreError>;
}

#[async_trait]
impl<T: IdentityStore + ?Sized> IdentityStore for Arc<T> {
    async fn create(&self, user: &User) -> guestgate_core::Result<User, StoreError> {
        (**self).create(user).await
    }

    async fn find_by_id(&self, id: UserId) -> guestgate_core::Result<Option<User>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn touch_updated_at(
        &self,
        id: UserId,
        now: DateTime<Utc>,
    ) -> guestgate_core::Result<(), StoreError> {
        (**self).touch_updated_at(id, now).await
    }
}
