//! Packer Module
//!
//! Converts application values to and from the bytes stored in the grid.
//!
//! ## Strategies
//! - `json`   - UTF-8 JSON text, `application/json` (default)
//! - `binary` - bincode, `application/octet-stream`
//!
//! The strategy is chosen once, when the connector is built. Every stored
//! value carries the strategy's content type so other grid clients can tell
//! the formats apart.

mod json;
mod binary;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

pub use json::JsonPacker;
pub use binary::BinaryPacker;

/// Encode/decode contract shared by all packers
pub trait ValuePacker {
    /// Content type sent with every packed value
    fn content_type(&self) -> &'static str;

    /// Pack a value into bytes
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    /// Unpack bytes produced by `encode`
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// Packer selection as it appears in configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackerKind {
    #[default]
    Json,
    Binary,
}

impl PackerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackerKind::Json => "json",
            PackerKind::Binary => "binary",
        }
    }
}

impl fmt::Display for PackerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackerKind {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(PackerKind::Json),
            "binary" => Ok(PackerKind::Binary),
            other => Err(GridError::Config(format!(
                "Invalid packer option {:?}, expected \"json\" or \"binary\"",
                other
            ))),
        }
    }
}

/// The packer resolved for a connector
#[derive(Debug, Clone, Copy)]
pub enum Packer {
    Json(JsonPacker),
    Binary(BinaryPacker),
}

impl Packer {
    pub fn new(kind: PackerKind) -> Self {
        match kind {
            PackerKind::Json => Packer::Json(JsonPacker),
            PackerKind::Binary => Packer::Binary(BinaryPacker),
        }
    }

    pub fn kind(&self) -> PackerKind {
        match self {
            Packer::Json(_) => PackerKind::Json,
            Packer::Binary(_) => PackerKind::Binary,
        }
    }
}

impl From<PackerKind> for Packer {
    fn from(kind: PackerKind) -> Self {
        Packer::new(kind)
    }
}

impl ValuePacker for Packer {
    fn content_type(&self) -> &'static str {
        match self {
            Packer::Json(p) => p.content_type(),
            Packer::Binary(p) => p.content_type(),
        }
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        match self {
            Packer::Json(p) => p.encode(value),
            Packer::Binary(p) => p.encode(value),
        }
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        match self {
            Packer::Json(p) => p.decode(bytes),
            Packer::Binary(p) => p.decode(bytes),
        }
    }
}
