//! JSON-string packer

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use super::ValuePacker;

/// Stores values as UTF-8 JSON text.
///
/// Values JSON cannot express are normalized on the way in: non-finite
/// floats become `null` and integer map keys become strings. Maps with
/// composite keys are rejected by `encode`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPacker;

impl JsonPacker {
    pub const CONTENT_TYPE: &'static str = "application/json";
}

impl ValuePacker for JsonPacker {
    fn content_type(&self) -> &'static str {
        Self::CONTENT_TYPE
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
