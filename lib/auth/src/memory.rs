//! In-memory identity store.
//!
//! Backs tests and local experiments. Failures can be injected per
//! operation so callers can exercise their error paths.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guestgate_core::UserId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::store::{IdentityStore, StoreError};
use crate::user::User;

/// Identity store holding users in a map.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    users: Mutex<HashMap<UserId, User>>,
    fail_creates: AtomicBool,
    fail_reads: AtomicBool,
    fail_touches: AtomicBool,
    touches: AtomicUsize,
}

impl MemoryIdentityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user directly, bypassing `create`.
    pub fn insert(&self, user: User) {
        self.users().insert(user.id(), user);
    }

    /// Removes a user, as an out-of-band deletion would.
    pub fn remove(&self, id: UserId) -> Option<User> {
        self.users().remove(&id)
    }

    /// Returns a snapshot of the stored user.
    #[must_use]
    pub fn get(&self, id: UserId) -> Option<User> {
        self.users().get(&id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users().is_empty()
    }

    /// Makes subsequent `create` calls fail with a constraint violation.
    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `find_by_id` calls fail as unavailable.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `touch_updated_at` calls fail as unavailable.
    pub fn fail_touches(&self, fail: bool) {
        self.fail_touches.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `touch_updated_at` calls.
    #[must_use]
    pub fn touch_count(&self) -> usize {
        self.touches.load(Ordering::SeqCst)
    }

    fn users(&self) -> MutexGuard<'_, HashMap<UserId, User>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn create(&self, user: &User) -> guestgate_core::Result<User, StoreError> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(StoreError::ConstraintViolation {
                details: "create rejected".to_string(),
            }
            .into());
        }

        let mut users = self.users();
        if users.contains_key(&user.id()) {
            return Err(StoreError::ConstraintViolation {
                details: format!("duplicate user id {}", user.id()),
            }
            .into());
        }
        users.insert(user.id(), user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: UserId) -> guestgate_core::Result<Option<User>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                details: "read rejected".to_string(),
            }
            .into());
        }

        Ok(self.get(id))
    }

    async fn touch_updated_at(
        &self,
        id: UserId,
        now: DateTime<Utc>,
    ) -> guestgate_core::Result<(), StoreError> {
        if self.fail_touches.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                details: "touch rejected".to_string(),
            }
            .into());
        }

        let mut users = self.users();
        let user = users
            .remove(&id)
            .ok_or(StoreError::NotFound { user_id: id })?;
        users.insert(id, user.touched(now));
        self.touches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
