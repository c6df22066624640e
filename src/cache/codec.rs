//! Value Codec Module
//!
//! Serializes values to CBOR and compresses them with zlib for storage.
//! CBOR keeps non-finite floats and non-string map keys intact.

use std::io::Read;

use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CacheError, Result};

// == Encode ==
/// Serializes and compresses a value.
///
/// `()` and `None` serialize to CBOR `null`, so the payload is never empty.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    ciborium::into_writer(value, &mut encoder).map_err(|e| match e {
        ciborium::ser::Error::Io(io) => CacheError::Internal(format!("compression failed: {}", io)),
        ciborium::ser::Error::Value(msg) => CacheError::Serialization(msg),
    })?;
    encoder
        .finish()
        .map_err(|e| CacheError::Internal(format!("compression failed: {}", e)))
}

// == Decode ==
/// Decompresses and deserializes a stored payload.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut raw = Vec::new();
    ZlibDecoder::new(bytes)
        .read_to_end(&mut raw)
        .map_err(|e| CacheError::Corruption(format!("decompression failed: {}", e)))?;

    ciborium::from_reader(raw.as_slice())
        .map_err(|e| CacheError::Corruption(format!("deserialization failed: {}", e)))
}
