//! Authentication endpoints for the guestgate server.
//!
//! This module provides:
//! - Guest login and token refresh routes
//! - A bearer-token extractor for protected routes
//! - The PostgreSQL identity store
//!
//! All routes are mounted under a configurable base path, `/api/v1/auth`
//! by default.

pub mod db;
pub mod middleware;
pub mod routes;

use axum::{
    Router,
    routing::{get, post},
};
use guestgate_auth::{AuthService, IdentityStore};
use std::sync::Arc;

pub use db::PgIdentityStore;
pub use middleware::RequireAuth;
pub use routes::{guest_login, profile, refresh};

/// Shared application state.
pub struct AppState {
    /// Auth use cases over the configured identity store.
    pub auth: AuthService<Arc<dyn IdentityStore>>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(auth: AuthService<Arc<dyn IdentityStore>>) -> Self {
        Self { auth }
    }
}

/// Builds the auth router mounted under `base_path`.
pub fn router(state: Arc<AppState>, base_path: &str) -> Router {
    let routes = Router::new()
        .route("/guest", post(routes::guest_login))
        .route("/refresh", post(routes::refresh))
        .route("/profile", get(routes::profile))
        .with_state(state);

    match normalize_base_path(base_path) {
        Some(path) => Router::new().nest(&path, routes),
        None => routes,
    }
}

/// Returns the base path with a leading and no trailing slash, or `None`
/// for the root.
fn normalize_base_path(base_path: &str) -> Option<String> {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{trimmed}"))
    }
}
