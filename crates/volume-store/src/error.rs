//! Error types for volume access.

use thiserror::Error;

/// Errors raised by the volume store.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// The dataset address is unreachable or its metadata is malformed.
    #[error("failed to open volume at {address}: {message}")]
    Open { address: String, message: String },

    /// A sub-region read failed (network, bounds or decode).
    #[error("failed to read volume data: {0}")]
    Read(String),
}

impl StoreError {
    /// Create an Open error.
    pub fn open(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Open {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Create a Read error.
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read(message.into())
    }

    /// True for errors raised while opening a volume.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

/// Result type for volume store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
