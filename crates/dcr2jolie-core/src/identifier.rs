//! Identifier management for DCR activities.
//!
//! This module provides the [`Id`] type, a stable activity identifier with
//! lexicographic ordering.

use std::fmt;

/// Stable identifier of an activity within a graph.
///
/// Ids are opaque strings taken verbatim from the source document. Their
/// `Ord` is lexicographic on the underlying string, which is the tie-break
/// order used everywhere deterministic iteration is required.
///
/// # Examples
///
/// ```
/// use dcr2jolie_core::identifier::Id;
///
/// let ask = Id::new("AskPrice");
/// let bid = Id::new("Bid");
/// assert!(ask < bid);
/// assert_eq!(ask, "AskPrice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(Box<str>);

impl Id {
    /// Creates an `Id` from &str.
    pub fn new(name: &str) -> Self {
        Self(name.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Id {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice.
    ///
    /// This is a convenience implementation that calls `Id::new`.
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Id {
    fn from(name: String) -> Self {
        Self(name.into_boxed_str())
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Id {
    /// Allows direct comparison with string references: `id == name`
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
