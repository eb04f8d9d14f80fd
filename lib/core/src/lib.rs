//! Core domain types and utilities for guestgate.
//!
//! This crate provides the identifier types and the error handling
//! foundation shared by the authentication library and the server.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{GuestId, ParseIdError, UserId};
