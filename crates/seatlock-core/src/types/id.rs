//! Newtype wrappers around opaque string identifiers.
//!
//! Using distinct types prevents accidentally passing a `HolderId` where a
//! `SeatLabel` is expected. Identifiers are supplied by clients, so they
//! are validated with [`validate_identifier`] before they reach the lock
//! protocol.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Maximum accepted length of any identifier, in characters.
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Macro to define a newtype identifier wrapper around `String`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the identifier is empty or whitespace only.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Opaque identifier of a showtime. One room exists per showtime.
    ShowtimeId
);

define_id!(
    /// Human-readable seat code, unique within a showtime (e.g. `"A1"`).
    SeatLabel
);

define_id!(
    /// Identifier of the client/user holding (or requesting) a seat lock.
    HolderId
);

/// Checks that an identifier is non-blank and within the length limit.
pub fn validate_identifier(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be blank")));
    }
    if value.chars().count() > MAX_IDENTIFIER_LEN {
        return Err(AppError::validation(format!(
            "{field} exceeds {MAX_IDENTIFIER_LEN} characters"
        )));
    }
    Ok(())
}
