//! guestgate HTTP server.
//!
//! Exposes guest login, token refresh and profile lookup over axum, backed
//! by a PostgreSQL identity store.

pub mod auth;
pub mod config;
pub mod error;
