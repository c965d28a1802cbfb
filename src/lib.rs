//! # gridkv
//!
//! Key-value client adapter for in-memory data grids exposed over REST:
//! - One grid map per collection, named `{collection}.LUT.O`
//! - Pluggable value packers (JSON text or bincode)
//! - TTL writes, with the ttl cleared by delete-then-write
//! - Glob key scans over the grid's query API
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      GridConnector                           │
//! │     set / get / clear / delete_all / iterate_keys            │
//! └──────┬──────────────────────┬──────────────────────┬────────┘
//!        │                      │                      │
//!        ▼                      ▼                      ▼
//!  ┌────────────┐        ┌─────────────┐        ┌────────────┐
//!  │  mapname   │        │   Packer    │        │  KeyScan   │
//!  │ (map name) │        │ json/binary │        │ (1 page)   │
//!  └─────┬──────┘        └──────┬──────┘        └─────┬──────┘
//!        │                      │                     │
//!        └──────────────────────┼─────────────────────┘
//!                               ▼
//!                       ┌──────────────┐
//!                       │   Executor   │
//!                       │ (reqwest +   │
//!                       │  cookie jar) │
//!                       └──────┬───────┘
//!                              ▼
//!                       Grid REST API
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use gridkv::{Config, GridConnector, SetOptions};
//!
//! # async fn demo() -> gridkv::Result<()> {
//! let config = Config::builder()
//!     .base_url("https://grid.example.com:9444/wxsdata/v1/grids/Grid1")
//!     .build();
//! let connector = GridConnector::new(config)?;
//!
//! connector.set("Session", "abc", &"payload", SetOptions::default()).await?;
//! let value: Option<String> = connector.get("Session", "abc").await?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod keys;
pub mod mapname;
pub mod packer;
pub mod network;
pub mod scan;
pub mod connector;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{GridError, Result};
pub use config::{Config, KeyLayout};
pub use connector::{GridConnector, RawEntry, SetOptions};
pub use mapname::CollectionSettings;
pub use packer::{Packer, PackerKind, ValuePacker};
pub use scan::{KeyFilter, KeyScan};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of gridkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
