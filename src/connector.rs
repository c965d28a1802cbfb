//! Connector Module
//!
//! Key-value operations on top of the grid REST API.
//!
//! ## Operations
//! | Method | Requests issued |
//! |--------|-----------------|
//! | `set` with ttl | `POST /{map}/{key}?ttl={s}` |
//! | `set` without ttl | `DELETE /{map}/{key}`, then `POST /{map}/{key}` |
//! | `get` | `GET /{map}/{key}` |
//! | `clear` | `DELETE /{map}/{key}` |
//! | `delete_all` | `DELETE /{map}` |
//! | `iterate_keys` | `GET {query}/{map}/?query={regex}` |
//! | `expire`, `ttl` | none, always `NotSupported` |
//!
//! ## Concurrency
//! Operations on one connector are not serialized. They all share the HTTP
//! client's cookie store, so several first requests issued at once may each
//! open their own grid session; the last `Set-Cookie` wins.

use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{Config, KeyLayout};
use crate::error::{GridError, Result};
use crate::keys;
use crate::mapname::{resolve_container, CollectionSettings};
use crate::network::{Endpoint, Executor, RequestSpec};
use crate::packer::{Packer, ValuePacker};
use crate::scan::{KeyFilter, KeyScan};

/// Error code the grid reports for a missing key
pub const OBJECT_NOT_FOUND: &str = "CWOBJ9752E";

/// Options for `set`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Time to live. `None` (or zero) stores the value without expiration.
    pub ttl: Option<Duration>,
}

impl SetOptions {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl: Some(ttl) }
    }
}

/// A stored value as returned by the grid, before unpacking
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub body: Bytes,
    pub headers: HeaderMap,
}

impl RawEntry {
    /// The `content-type` the value was stored with
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

/// Where a logical key lives on the grid
#[derive(Debug, Clone, PartialEq, Eq)]
struct Location<'k> {
    map: String,
    key: Cow<'k, str>,
}

#[derive(Debug, Deserialize)]
struct QueryPage {
    #[serde(default)]
    items: Vec<QueryItem>,
}

#[derive(Debug, Deserialize)]
struct QueryItem {
    key: String,
}

/// Key-value connector for one grid
pub struct GridConnector {
    config: Config,
    executor: Executor,
    packer: Packer,

    /// Per-collection settings, consulted on every call
    collections: RwLock<HashMap<String, CollectionSettings>>,
}

impl GridConnector {
    /// Create a connector
    ///
    /// Fails on invalid configuration before any request is made.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let executor = Executor::new(&config.base_url, config.strict_ssl)?;
        let packer = Packer::new(config.packer);
        let collections = RwLock::new(config.collections.clone());

        tracing::debug!(
            base_url = %executor.base_url(),
            query_url = %executor.query_url(),
            packer = %config.packer,
            strict_ssl = config.strict_ssl,
            "grid connector created"
        );

        Ok(Self {
            config,
            executor,
            packer,
            collections,
        })
    }

    pub fn packer(&self) -> &Packer {
        &self.packer
    }

    /// Register or replace the settings of a collection
    pub fn define_collection(&self, name: impl Into<String>, settings: CollectionSettings) {
        self.collections.write().insert(name.into(), settings);
    }

    /// Grid map holding the keys of `collection`
    pub fn mapname(&self, collection: &str) -> String {
        let collections = self.collections.read();
        resolve_container(collection, collections.get(collection))
    }

    /// Grid map a collection's keys are stored in, for the configured layout
    fn container(&self, collection: &str) -> String {
        match &self.config.key_layout {
            KeyLayout::PerContainer => self.mapname(collection),
            KeyLayout::Flat { map } => self.mapname(map),
        }
    }

    /// Storage location of one key
    ///
    /// Keys that URL resolution would collapse into the map itself or its
    /// parent (`""`, `.`, `..`) are rejected before any request is built.
    fn locate<'k>(&self, collection: &str, key: &'k str) -> Result<Location<'k>> {
        let key = match &self.config.key_layout {
            KeyLayout::PerContainer => Cow::Borrowed(key),
            KeyLayout::Flat { .. } => Cow::Owned(keys::compose(collection, key)),
        };
        if matches!(key.as_ref(), "" | "." | "..") {
            return Err(GridError::InvalidKey(format!(
                "{:?} does not name a single key",
                key
            )));
        }

        Ok(Location {
            map: self.container(collection),
            key,
        })
    }

    // =========================================================================
    // Key-Value Operations
    // =========================================================================

    /// Store `value` under `key`
    ///
    /// The grid cannot remove a ttl from an existing entry, so a write
    /// without ttl first deletes the key. That delete is allowed to fail
    /// (usually because the key does not exist yet); only the write itself
    /// decides the outcome.
    pub async fn set<T>(&self, collection: &str, key: &str, value: &T, options: SetOptions) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let location = self.locate(collection, key)?;
        let body = self.packer.encode(value)?;
        tracing::debug!(map = %location.map, key = %location.key, ttl = ?options.ttl, "set");

        match options.ttl.filter(|ttl| !ttl.is_zero()) {
            Some(ttl) => self.post_value(&location, body, Some(ttl)).await,
            None => {
                if let Err(e) = self.delete_key(&location).await {
                    tracing::warn!(
                        map = %location.map,
                        key = %location.key,
                        "cannot delete the key before setting a new value: {}",
                        e
                    );
                }
                self.post_value(&location, body, None).await
            }
        }
    }

    async fn post_value(&self, location: &Location<'_>, body: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let mut spec = RequestSpec::for_key(Method::POST, &location.key)
            .body(body, self.packer.content_type());
        if let Some(ttl) = ttl {
            spec = spec.query("ttl", ttl_seconds(ttl).to_string());
        }

        self.executor.execute(&location.map, spec).await?;
        Ok(())
    }

    async fn delete_key(&self, location: &Location<'_>) -> Result<()> {
        let spec = RequestSpec::for_key(Method::DELETE, &location.key);
        self.executor.execute(&location.map, spec).await?;
        Ok(())
    }

    /// Fetch and unpack the value stored under `key`
    ///
    /// A missing key is `Ok(None)`.
    pub async fn get<T: DeserializeOwned>(&self, collection: &str, key: &str) -> Result<Option<T>> {
        match self.get_raw(collection, key).await? {
            Some(entry) => Ok(Some(self.packer.decode(&entry.body)?)),
            None => Ok(None),
        }
    }

    /// Fetch the stored bytes and response headers without unpacking
    pub async fn get_raw(&self, collection: &str, key: &str) -> Result<Option<RawEntry>> {
        let location = self.locate(collection, key)?;
        let spec = RequestSpec::for_key(Method::GET, &location.key);

        match self.executor.execute(&location.map, spec).await {
            Ok(response) => {
                tracing::debug!(map = %location.map, key = %location.key, len = response.body.len(), "get");
                Ok(Some(RawEntry {
                    body: response.body,
                    headers: response.headers,
                }))
            }
            Err(e) if is_object_not_found(&e) => {
                tracing::debug!(map = %location.map, key = %location.key, "get -> (404 Not Found)");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete one key
    pub async fn clear(&self, collection: &str, key: &str) -> Result<()> {
        let location = self.locate(collection, key)?;
        tracing::debug!(map = %location.map, key = %location.key, "clear");
        self.delete_key(&location).await
    }

    /// Not supported: the REST API cannot change a ttl without rewriting the value
    pub async fn expire(&self, _collection: &str, _key: &str, _ttl: Duration) -> Result<()> {
        Err(GridError::NotSupported { operation: "expire" })
    }

    /// Not supported: the REST API does not report ttls
    pub async fn ttl(&self, _collection: &str, _key: &str) -> Result<Duration> {
        Err(GridError::NotSupported { operation: "ttl" })
    }

    /// Delete every key of a collection
    pub async fn delete_all(&self, collection: &str) -> Result<()> {
        match &self.config.key_layout {
            KeyLayout::PerContainer => {
                let map = self.mapname(collection);
                tracing::debug!(%map, "delete all");
                self.executor
                    .execute(&map, RequestSpec::new(Method::DELETE, ""))
                    .await?;
                Ok(())
            }
            KeyLayout::Flat { .. } => {
                // Shared map: delete the collection's keys one query page at a time.
                let pattern = self.query_pattern(collection, ".*");
                loop {
                    let page = self.query_keys(collection, &pattern).await?;
                    if page.is_empty() {
                        return Ok(());
                    }
                    let map = self.container(collection);
                    for key in page {
                        let location = Location {
                            map: map.clone(),
                            key: Cow::Owned(key),
                        };
                        self.delete_key(&location).await?;
                    }
                }
            }
        }
    }

    // =========================================================================
    // Key Scans
    // =========================================================================

    /// Iterate the keys of a collection matching `filter`
    ///
    /// Only the first page returned by the grid is visited.
    pub fn iterate_keys(&self, collection: &str, filter: KeyFilter) -> KeyScan<'_> {
        let regex = filter.to_regex();
        let pattern = self.query_pattern(collection, &regex);
        KeyScan::new(self, collection, pattern)
    }

    /// Server-side pattern for a key regex
    fn query_pattern(&self, collection: &str, regex: &str) -> String {
        match &self.config.key_layout {
            KeyLayout::PerContainer => regex.to_string(),
            KeyLayout::Flat { .. } => {
                let prefix = urlencoding::encode(collection);
                format!(
                    "{}{}{}",
                    crate::scan::escape_regex(&prefix),
                    keys::SEPARATOR,
                    regex
                )
            }
        }
    }

    /// Run one key query; returns storage keys in server order
    pub(crate) async fn query_keys(&self, collection: &str, pattern: &str) -> Result<Vec<String>> {
        let map = self.container(collection);
        let spec = RequestSpec::new(Method::GET, "/")
            .endpoint(Endpoint::Query)
            .query("query", pattern);

        let response = self.executor.execute(&map, spec).await?;
        let page: QueryPage = serde_json::from_slice(&response.body)?;
        tracing::debug!(%map, %pattern, count = page.items.len(), "key query");

        Ok(page.items.into_iter().map(|item| item.key).collect())
    }

    /// Map a storage key from a query back to the caller's key
    pub(crate) fn logical_key(&self, collection: &str, storage_key: String) -> String {
        if let KeyLayout::PerContainer = self.config.key_layout {
            return storage_key;
        }

        match keys::parse(&storage_key) {
            Ok(parsed) => {
                if parsed.collection != collection {
                    tracing::warn!(
                        expected = %collection,
                        actual = %parsed.collection,
                        key = %storage_key,
                        "key scan returned a key belonging to a wrong collection"
                    );
                }
                parsed.key
            }
            Err(GridError::InvalidKey(_)) => storage_key,
            Err(e) => {
                tracing::warn!(key = %storage_key, "cannot parse storage key: {}", e);
                storage_key
            }
        }
    }
}

/// `true` for the grid's 404 "object not found" answer
pub fn is_object_not_found(err: &GridError) -> bool {
    err.status_code() == Some(404)
        && err
            .remote_message()
            .map_or(false, |m| m.starts_with(OBJECT_NOT_FOUND))
}

/// Whole seconds for the `ttl` query parameter, rounded up
pub fn ttl_seconds(ttl: Duration) -> u64 {
    let millis = ttl.as_millis();
    millis.div_ceil(1000) as u64
}
