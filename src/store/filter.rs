//! Single `key:value` metadata filter.

use std::fmt;
use std::str::FromStr;

use crate::StoreError;

/// A metadata equality constraint parsed from `key:value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    key: String,
    value: String,
}

impl TagFilter {
    /// Build a filter from its parts.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parse `key:value`. Exactly one `:` is required; either side may be empty.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        let mut parts = s.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) => Ok(Self::new(key, value)),
            _ => Err(StoreError::Validation(
                "Invalid tags format. Use key:value.".to_string(),
            )),
        }
    }

    /// Metadata key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Expected metadata value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl FromStr for TagFilter {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.value)
    }
}
