//! Serialization codec.
//!
//! JSON-backed, pure and deterministic. Date/time values travel as RFC 3339
//! strings in UTC, so sub-second precision survives a round-trip and the
//! decoded value is the identical instant on any host. Empty collections and
//! absent values are distinct and both representable.

use serde::de::DeserializeOwned;
use serde::Serialize;
use stratus_core::{StratusError, StratusResult};

/// Encodes a value to its wire representation.
pub fn encode<T: Serialize>(value: &T) -> StratusResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| StratusError::serialization(e.to_string()))
}

/// Decodes a value from its wire representation.
///
/// Fails with [`StratusError::Serialization`] on malformed input or a shape
/// mismatch between the bytes and the target type.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StratusResult<T> {
    serde_json::from_slice(bytes).map_err(|e| StratusError::serialization(e.to_string()))
}
