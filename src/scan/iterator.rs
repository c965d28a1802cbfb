//! Key scan cursor

use std::collections::VecDeque;

use futures::stream::{self, Stream};

use crate::connector::GridConnector;
use crate::error::{GridError, Result};

/// Scan progress
#[derive(Debug)]
enum ScanState {
    /// No query issued yet
    Unstarted,

    /// Keys of the fetched page not yet handed out
    Buffered(VecDeque<String>),

    /// Nothing left; never queries again
    Exhausted,
}

/// Pull-based cursor over the keys of one collection
///
/// Single pass: once `next` returns `Ok(None)` it keeps doing so. A failed
/// first query leaves the scan unstarted, so the next pull retries it.
pub struct KeyScan<'a> {
    connector: &'a GridConnector,
    collection: String,
    pattern: String,
    state: ScanState,
}

impl<'a> KeyScan<'a> {
    pub(crate) fn new(connector: &'a GridConnector, collection: &str, pattern: String) -> Self {
        Self {
            connector,
            collection: collection.to_string(),
            pattern,
            state: ScanState::Unstarted,
        }
    }

    /// Regex sent to the grid
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, ScanState::Exhausted)
    }

    /// Next key, or `None` at the end of the scan
    pub async fn next(&mut self) -> Result<Option<String>> {
        loop {
            match &mut self.state {
                ScanState::Unstarted => {
                    let page = self
                        .connector
                        .query_keys(&self.collection, &self.pattern)
                        .await?;
                    self.state = if page.is_empty() {
                        ScanState::Exhausted
                    } else {
                        ScanState::Buffered(page.into())
                    };
                }
                ScanState::Buffered(buffer) => match buffer.pop_front() {
                    Some(key) => {
                        return Ok(Some(self.connector.logical_key(&self.collection, key)));
                    }
                    None => self.state = ScanState::Exhausted,
                },
                ScanState::Exhausted => return Ok(None),
            }
        }
    }

    /// Drain the scan into a vector
    pub async fn collect_keys(mut self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        while let Some(key) = self.next().await? {
            keys.push(key);
        }
        Ok(keys)
    }

    /// Adapt the cursor into a `Stream`
    pub fn into_stream(self) -> impl Stream<Item = Result<String>> + 'a {
        stream::try_unfold(self, |mut scan| async move {
            let key = scan.next().await?;
            Ok::<_, GridError>(key.map(|key| (key, scan)))
        })
    }
}
