//! Newtype wrapper for pool identifiers.
//!
//! Serializes as a plain string so manifests and JSON reports stay readable.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Vdev keywords `zpool create` refuses as the start of a pool name.
const RESERVED_PREFIXES: &[&str] = &["mirror", "raidz", "draid", "spare"];

/// Refused only as the whole name.
const RESERVED_NAMES: &[&str] = &["log"];

/// Name of a ZFS storage pool, as passed to and reported by `zpool(8)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolName(String);

impl PoolName {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Check the name against the rules `zpool create` enforces.
    ///
    /// Returns a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        let name = self.0.as_str();
        let Some(first) = name.chars().next() else {
            return Err("pool name must not be empty".to_owned());
        };
        if !first.is_ascii_alphabetic() {
            return Err(format!("pool name '{name}' must begin with a letter"));
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.')))
        {
            return Err(format!("pool name '{name}' contains invalid character '{bad}'"));
        }
        if RESERVED_PREFIXES.iter().any(|r| name.starts_with(r)) {
            return Err(format!("pool name '{name}' begins with a reserved vdev keyword"));
        }
        if RESERVED_NAMES.contains(&name) {
            return Err(format!("pool name '{name}' is a reserved vdev keyword"));
        }
        Ok(())
    }
}

impl Deref for PoolName {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PoolName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PoolName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PoolName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PoolName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<String> for PoolName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PoolName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
