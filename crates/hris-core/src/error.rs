use thiserror::Error;

use crate::codec::DecodeError;
use crate::storage::StorageError;

/// Failure of an initial-data fetch.
///
/// Storage quota problems never appear here: they are downgraded to a warning
/// once the new snapshot is in memory.
#[derive(Error, Debug)]
pub enum HrisError {
    #[error("Network error: {0:#}")]
    Network(#[source] anyhow::Error),

    #[error("Failed to decode initial data: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl HrisError {
    pub fn is_network(&self) -> bool {
        matches!(self, HrisError::Network(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, HrisError::Decode(_))
    }
}
