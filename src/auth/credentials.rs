//! Credential verification.
//!
//! Request handling only sees the [`CredentialVerifier`] trait, so the
//! static user table can be replaced by another identity provider.

use std::collections::HashMap;

use tracing::debug;

use super::password::{hash_password_with, verify_password, HashCost, PasswordError};
use crate::config::UserEntry;

/// Checks a username/password pair.
pub trait CredentialVerifier: Send + Sync {
    /// Returns `true` when the credentials are valid.
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Fixed in-memory user table holding Argon2id hashes.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, String>,
}

impl StaticCredentials {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash every configured password with the default cost.
    pub fn from_users(users: &[UserEntry]) -> Result<Self, PasswordError> {
        Self::from_users_with_cost(users, HashCost::default())
    }

    /// Hash every configured password with the given cost.
    pub fn from_users_with_cost(
        users: &[UserEntry],
        cost: HashCost,
    ) -> Result<Self, PasswordError> {
        let mut table = Self::new();
        for user in users {
            table.insert_hash(&user.username, hash_password_with(&user.password, cost)?);
        }
        Ok(table)
    }

    /// Add a user with an already hashed password (PHC string).
    pub fn insert_hash(&mut self, username: impl Into<String>, hash: impl Into<String>) {
        self.users.insert(username.into(), hash.into());
    }

    /// Number of known users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the table has no users.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        let Some(hash) = self.users.get(username) else {
            debug!(username, "Unknown user");
            return false;
        };

        match verify_password(password, hash) {
            Ok(()) => true,
            Err(e) => {
                debug!(username, error = %e, "Password rejected");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHEAP: HashCost = HashCost {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    };

    fn users() -> Vec<UserEntry> {
        vec![
            UserEntry {
                username: "user".to_string(),
                password: "password".to_string(),
            },
            UserEntry {
                username: "admin".to_string(),
                password: "hunter2".to_string(),
            },
        ]
    }

    #[test]
    fn test_from_users_hashes_passwords() {
        let creds = StaticCredentials::from_users_with_cost(&users(), CHEAP).unwrap();

        assert_eq!(creds.len(), 2);
        assert!(creds.users.values().all(|h| h.starts_with("$argon2id$")));
        assert!(!creds.users.values().any(|h| h.contains("password")));
    }

    #[test]
    fn test_verify_valid_credentials() {
        let creds = StaticCredentials::from_users_with_cost(&users(), CHEAP).unwrap();

        assert!(creds.verify("user", "password"));
        assert!(creds.verify("admin", "hunter2"));
    }

    #[test]
    fn test_verify_wrong_password() {
        let creds = StaticCredentials::from_users_with_cost(&users(), CHEAP).unwrap();

        assert!(!creds.verify("user", "hunter2"));
        assert!(!creds.verify("user", ""));
    }

    #[test]
    fn test_verify_unknown_user() {
        let creds = StaticCredentials::from_users_with_cost(&users(), CHEAP).unwrap();

        assert!(!creds.verify("mallory", "password"));
    }

    #[test]
    fn test_verify_corrupt_hash() {
        let mut creds = StaticCredentials::new();
        creds.insert_hash("user", "garbage");

        assert!(!creds.verify("user", "password"));
    }

    #[test]
    fn test_empty_table() {
        let creds = StaticCredentials::new();
        assert!(creds.is_empty());
        assert!(!creds.verify("user", "password"));
    }
}
