use std::{fmt, ops::Deref, sync::Arc};

use crate::TollgateError;

/// A validated store key.
///
/// This is a string with the following constraints:
/// - Must not be empty
/// - Must not be longer than 255 characters
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Hash)]
pub struct StoreKey(Arc<str>);

impl StoreKey {
    pub(crate) fn from_static(value: &'static str) -> Self {
        Self(Arc::from(value))
    }

    /// View the key as a plain string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for StoreKey {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for StoreKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StoreKey {
    type Error = TollgateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Err(TollgateError::InvalidKey(
                "store key must not be empty".to_string(),
            ))
        } else if value.len() > 255 {
            Err(TollgateError::InvalidKey(
                "store key must not be longer than 255 characters".to_string(),
            ))
        } else {
            Ok(Self(Arc::from(value)))
        }
    }
}

impl TryFrom<&str> for StoreKey {
    type Error = TollgateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_string())
    }
}

/// The numbered partition within the shared store that scopes all keys for
/// one deployment (a Redis database index, for instance).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Namespace(u32);

impl Deref for Namespace {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u32> for Namespace {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated requests-per-minute ceiling. Must be finite and greater
/// than zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Rpm(f64);

impl Deref for Rpm {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<f64> for Rpm {
    type Error = TollgateError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value <= 0.0 {
            Err(TollgateError::InvalidRate(
                "rate must be a finite number greater than 0".to_string(),
            ))
        } else {
            Ok(Self(value))
        }
    }
}

/// A validated number of simultaneous semaphore holders. Must be at
/// least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Permits(u32);

impl Permits {
    /// A single permit, i.e. mutual exclusion.
    pub fn one() -> Self {
        Self(1)
    }
}

impl Deref for Permits {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<u32> for Permits {
    type Error = TollgateError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value == 0 {
            Err(TollgateError::InvalidPermits(
                "permit count must be at least 1".to_string(),
            ))
        } else {
            Ok(Self(value))
        }
    }
}
