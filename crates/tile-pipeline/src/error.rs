//! Error types for the tile pipeline.

use seismic_common::{SliceError, TileCoord};
use thiserror::Error;
use volume_store::StoreError;

/// A single tile's read failed. Local to that tile.
#[derive(Error, Debug, Clone)]
#[error("tile {coord} fetch failed: {source}")]
pub struct FetchError {
    pub coord: TileCoord,
    #[source]
    pub source: StoreError,
}

impl FetchError {
    pub fn new(coord: TileCoord, source: StoreError) -> Self {
        Self { coord, source }
    }
}

/// Errors that abort a whole render generation.
#[derive(Error, Debug, Clone)]
pub enum RenderError {
    /// Dataset or level could not be opened.
    #[error(transparent)]
    Open(StoreError),

    /// Slice number outside the opened volume.
    #[error(transparent)]
    Slice(#[from] SliceError),

    /// A whole-slice read failed.
    #[error(transparent)]
    Read(StoreError),

    /// Invalid pipeline configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RenderError {
    /// Create an Open error.
    pub fn open(err: StoreError) -> Self {
        Self::Open(err)
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
