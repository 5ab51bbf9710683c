//! Name normalization
//!
//! Every index in the crate is keyed by a [`NameKey`]: the display name
//! lower-cased with everything that is not a letter or digit removed, so
//! "City A", "city a" and "City-A" all collide.

use std::borrow::Borrow;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,

    #[error("Name {0:?} contains no letters or digits")]
    NoAlphanumerics(String),
}

/// Normalized lookup key derived from a display name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameKey(String);

impl NameKey {
    /// Normalize a display name into a key.
    pub fn normalize(name: &str) -> Result<Self, NameError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(NameError::Empty);
        }

        // Lower-case first: some lower-case mappings emit combining marks,
        // which must be filtered out for the result to stay stable.
        let key: String = trimmed
            .chars()
            .flat_map(char::to_lowercase)
            .filter(|c| c.is_alphanumeric())
            .collect();

        if key.is_empty() {
            return Err(NameError::NoAlphanumerics(name.to_string()));
        }
        Ok(Self(key))
    }

    /// Normalize a batch of names; any invalid element fails the whole batch.
    pub fn normalize_all<S: AsRef<str>>(names: &[S]) -> Result<Vec<Self>, NameError> {
        names.iter().map(|n| Self::normalize(n.as_ref())).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NameKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NameKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NameKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for NameKey {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::normalize(value)
    }
}

/// Anything with a display name and the key derived from it
pub trait Named {
    /// Display name
    fn name(&self) -> &str;

    /// Normalized primary key
    fn key(&self) -> &NameKey;
}
