//! Scan Module
//!
//! Key scans over a collection.
//!
//! ## Flow
//! ```text
//!  glob "user.*"  ──glob_to_regex──►  "user\..*"  ──query──►  grid
//!                                                              │
//!  KeyScan::next() ◄── buffered page (at most one server page) ◄┘
//! ```
//!
//! The grid answers a key query with a bounded page (500 keys for a
//! default grid). A scan fetches that page once and never asks for more, so
//! collections larger than one page are only partially visited.

mod glob;
mod iterator;

pub use glob::{escape_regex, glob_to_regex};
pub use iterator::KeyScan;

/// Glob used when no filter is given
pub const MATCH_ALL: &str = "*";

/// Filter for `GridConnector::iterate_keys`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFilter {
    /// Glob (`*`, `?`) the keys must match; all keys when `None`
    pub match_glob: Option<String>,
}

impl KeyFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matching(glob: impl Into<String>) -> Self {
        Self {
            match_glob: Some(glob.into()),
        }
    }

    /// The regex sent to the grid
    pub fn to_regex(&self) -> String {
        glob_to_regex(self.match_glob.as_deref().unwrap_or(MATCH_ALL))
    }
}
