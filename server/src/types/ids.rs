//! ID types for drinks.
//!
//! Drinks are keyed by the integer row id the store assigns on insert. The
//! newtype keeps those ids from being mixed up with ingredient quantities or
//! other plain integers flowing through the handlers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unique identifier for a drink.
///
/// # Invariants
///
/// - Assigned by the store on creation and never changed afterwards.
/// - Serializes as a bare JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrinkId(pub i64);

impl DrinkId {
    /// Get the raw row id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for DrinkId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for DrinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
