//! Guest identities and bearer tokens for guestgate.
//!
//! This crate provides:
//! - User records (`User`) with guest and federated identities
//! - Signed access and refresh tokens (`TokenCodec`)
//! - Guest creation (`GuestBootstrapper`)
//! - The use cases exposed over HTTP (`AuthService`)
//! - The persistence contract (`IdentityStore`) and an in-memory store
//!
//! # Token model
//!
//! Access tokens are short-lived and carry the user's role. Refresh tokens
//! are long-lived and can only be exchanged for a new pair. Both are HS256
//! JWTs signed with one shared secret and tagged with their type, so one
//! kind is never accepted in place of the other.
//!
//! # Example
//!
//! ```
//! use guestgate_auth::{AuthConfig, AuthService, MemoryIdentityStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = AuthConfig::builder("change-me".to_string())
//!     .guest_id_range(1, 100_000)
//!     .build()
//!     .unwrap();
//! let service = AuthService::new(config, MemoryIdentityStore::new()).unwrap();
//!
//! let login = service.guest_login().await.unwrap();
//! assert!(login.user.is_guest());
//! assert_eq!(service.authorize(&login.access_token).unwrap(), login.user.id());
//!
//! let refreshed = service.refresh(&login.refresh_token).await.unwrap();
//! assert_ne!(refreshed.access_token, login.access_token);
//! # }
//! ```

pub mod auth;
pub mod claims;
pub mod config;
pub mod error;
pub mod guest;
pub mod memory;
pub mod role;
pub mod service;
pub mod store;
pub mod token;
pub mod user;

// Re-export main types at crate root
pub use auth::{AuthenticatedUser, LoginResponse, RefreshTokenRequest};
pub use claims::{AccessClaims, RefreshClaims, TokenType};
pub use config::{AuthConfig, AuthConfigBuilder, MAX_TOKEN_TTL_SECONDS};
pub use error::{AuthError, ConfigError};
pub use guest::GuestBootstrapper;
pub use memory::MemoryIdentityStore;
pub use role::{ParseRoleError, Role};
pub use service::AuthService;
pub use store::{IdentityStore, StoreError};
pub use token::TokenCodec;
pub use user::User;
