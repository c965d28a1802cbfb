//! Key Composer
//!
//! Builds and parses flat storage keys of the form `{collection}:{key}`.
//! Only used with [`KeyLayout::Flat`](crate::config::KeyLayout::Flat), where
//! every collection shares one grid map.
//!
//! The collection name is percent-encoded so that `("a:b", "c")` and
//! `("a", "b:c")` never collide. The key part is kept verbatim.

use std::borrow::Cow;

use crate::error::{GridError, Result};

/// Separator between the collection prefix and the key
pub const SEPARATOR: char = ':';

/// A flat storage key split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    pub collection: String,
    pub key: String,
}

/// Compose a flat storage key
pub fn compose(collection: &str, key: &str) -> String {
    let prefix = urlencoding::encode(collection);
    let mut composed = String::with_capacity(prefix.len() + 1 + key.len());
    composed.push_str(&prefix);
    composed.push(SEPARATOR);
    composed.push_str(key);
    composed
}

/// Split a flat storage key back into (collection, key)
///
/// Fails with `InvalidKey` when the key carries no collection prefix.
pub fn parse(composed: &str) -> Result<ParsedKey> {
    let (prefix, key) = composed
        .split_once(SEPARATOR)
        .ok_or_else(|| GridError::InvalidKey(format!("missing collection prefix in {:?}", composed)))?;

    let collection = urlencoding::decode(prefix)
        .unwrap_or(Cow::Borrowed(prefix))
        .into_owned();

    Ok(ParsedKey {
        collection,
        key: key.to_string(),
    })
}
