//! Validated user identifier.
//!
//! [`UserId`] is the stable identity handed to the relay by the
//! authentication layer. The relay never authenticates it; it only
//! enforces that the value is usable as a registry key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// Maximum accepted length of a user id, in bytes.
pub const MAX_USER_ID_BYTES: usize = 128;

/// Identifier of a platform user.
///
/// Always non-empty, trimmed, and at most [`MAX_USER_ID_BYTES`] long.
/// Used as the key of [`super::ConnectionRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Parses and validates a raw user id.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidUserId`] if the trimmed value is empty
    /// or longer than [`MAX_USER_ID_BYTES`].
    pub fn parse(raw: &str) -> Result<Self, RelayError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RelayError::InvalidUserId("user id is empty".to_string()));
        }
        if trimmed.len() > MAX_USER_ID_BYTES {
            return Err(RelayError::InvalidUserId(format!(
                "user id exceeds {MAX_USER_ID_BYTES} bytes"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
