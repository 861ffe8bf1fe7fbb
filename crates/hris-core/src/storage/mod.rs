//! Durable key-value storage capability.
//!
//! The session and initial-data stores only ever see a `KeyValueStore`:
//! string keys mapping to string values, with writes that may fail because a
//! size quota is exhausted. Two backends are provided:
//!
//! - `FileStore`: one file per key in a directory (used by the CLI)
//! - `MemoryStore`: a process-local map (used by tests and ephemeral sessions)

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Key holding the bearer token of the signed-in user.
pub const TOKEN_KEY: &str = "token";

/// Key holding the signed-in user's profile as JSON.
pub const USER_KEY: &str = "user";

/// Key holding the server-issued hash of the cached snapshot.
pub const HASH_VALUE_KEY: &str = "hris_hash_value";

/// Key holding the cached initial-data snapshot as JSON.
pub const INITIAL_DATA_KEY: &str = "hris_initial_data";

/// Key holding the language used for the last initial-data fetch.
pub const LANGUAGE_KEY: &str = "hris_language";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage quota exceeded writing '{key}': {requested} bytes requested, limit is {limit}")]
    QuotaExceeded {
        key: String,
        requested: u64,
        limit: u64,
    },

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize value: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

impl StorageError {
    pub fn is_quota(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded { .. })
    }
}

pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key was never written or was removed.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Checks whether replacing `key` with `value_len` bytes keeps the total under
/// `limit`. `others` is the byte count of every other key.
pub(crate) fn check_quota(
    key: &str,
    value_len: usize,
    others: u64,
    limit: Option<u64>,
) -> Result<(), StorageError> {
    let Some(limit) = limit else {
        return Ok(());
    };
    let requested = others + (key.len() + value_len) as u64;
    if requested > limit {
        return Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            requested,
            limit,
        });
    }
    Ok(())
}
