//! Authentication module for tagvault.
//!
//! This module provides password hashing and the credential verification
//! capability used by the HTTP layer.

mod credentials;
mod password;

pub use credentials::{CredentialVerifier, StaticCredentials};
pub use password::{hash_password, hash_password_with, verify_password, HashCost, PasswordError};
