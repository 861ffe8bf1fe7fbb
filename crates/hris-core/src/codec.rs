//! Compression codec for the initial-data payload.
//!
//! The server ships the organization snapshot as JSON, zlib-deflated and
//! base64-encoded. `decompress` undoes all three stages; `compress` is the
//! inverse and exists mostly so tests and tools can build payloads.

use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Corrupt deflate stream: {0}")]
    Inflate(#[source] std::io::Error),

    #[error("Invalid JSON in payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Failed to serialize value: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to deflate payload: {0}")]
    Deflate(#[from] std::io::Error),
}

/// Decode a base64, zlib-compressed JSON document into `T`.
pub fn decompress<T: DeserializeOwned>(compressed: &str) -> Result<T, DecodeError> {
    let bytes = STANDARD.decode(compressed.trim()).map_err(|e| {
        error!(error = %e, "Failed to decode base64 payload");
        DecodeError::Base64(e)
    })?;

    let mut json = String::new();
    ZlibDecoder::new(bytes.as_slice())
        .read_to_string(&mut json)
        .map_err(|e| {
            error!(error = %e, "Failed to inflate payload");
            DecodeError::Inflate(e)
        })?;

    debug!(
        compressed_bytes = bytes.len(),
        inflated_bytes = json.len(),
        "Inflated payload"
    );

    serde_json::from_str(&json).map_err(|e| {
        error!(error = %e, "Failed to parse inflated payload");
        DecodeError::Json(e)
    })
}

/// Serialize `value` to JSON, deflate it and encode the result as base64.
pub fn compress<T: Serialize + ?Sized>(value: &T) -> Result<String, EncodeError> {
    let json = serde_json::to_vec(value)?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let deflated = encoder.finish()?;
    Ok(STANDARD.encode(deflated))
}
