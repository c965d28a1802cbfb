//! Binary packer
//!
//! bincode keeps the exact Rust representation of a value (byte blobs,
//! non-finite floats, 128-bit integers, enum variants, timestamps). The
//! encoding is not self-describing: a value must be decoded into the same
//! type it was encoded from.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use super::ValuePacker;

#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryPacker;

impl BinaryPacker {
    pub const CONTENT_TYPE: &'static str = "application/octet-stream";
}

impl ValuePacker for BinaryPacker {
    fn content_type(&self) -> &'static str {
        Self::CONTENT_TYPE
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        Ok(bincode::serialize(value)?)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        Ok(bincode::deserialize(bytes)?)
    }
}
