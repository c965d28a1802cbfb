//! Namespace Resolver
//!
//! Every collection lives in its own grid map ("container"). The map name
//! is the collection name, or a per-collection override, followed by the
//! suffix that selects the map's eviction policy:
//!
//! ```text
//! TestModel          ->  TestModel.LUT.O
//! TestModel (JavaMap) ->  JavaMap.LUT.O
//! ```
//!
//! `LUT` makes entries expire by LastUpdateTime and `O` turns on
//! optimistic locking. The grid creates the map on first use with these
//! settings, so the suffix must be identical on every request.

use serde::{Deserialize, Serialize};

/// Suffix selecting LastUpdateTime expiration with optimistic locking
pub const EXPIRATION_SUFFIX: &str = ".LUT.O";

/// Per-collection settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSettings {
    /// Grid map name to use instead of the collection name
    ///
    /// Read as `mapname` or `mapName`. Giving both in one table is a
    /// duplicate field error.
    #[serde(default, alias = "mapName", skip_serializing_if = "Option::is_none")]
    pub mapname: Option<String>,
}

impl CollectionSettings {
    pub fn with_mapname(mapname: impl Into<String>) -> Self {
        Self {
            mapname: Some(mapname.into()),
        }
    }
}

/// Resolve the container name for a collection.
pub fn resolve_container(collection: &str, settings: Option<&CollectionSettings>) -> String {
    let base = settings
        .and_then(|s| s.mapname.as_deref())
        .unwrap_or(collection);

    let mut name = String::with_capacity(base.len() + EXPIRATION_SUFFIX.len());
    name.push_str(base);
    name.push_str(EXPIRATION_SUFFIX);
    name
}
