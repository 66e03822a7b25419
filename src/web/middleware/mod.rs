//! Middleware for the web API.

pub mod auth;
pub mod cors;

pub use auth::{basic_auth, AuthUser};
pub use cors::create_cors_layer;
