//! Store and array traits consumed by the tile pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use seismic_common::VolumeShape;

use crate::error::Result;
use crate::types::{PlaneSelection, SampleBlock};

/// An opened 3-axis volume. Immutable once opened.
#[async_trait]
pub trait VolumeArray: Send + Sync {
    /// Shape `[n_inline, n_crossline, n_sample]`.
    fn shape(&self) -> VolumeShape;

    /// Read one sub-region of a slice plane.
    ///
    /// Each call is independent; failures are returned per call and never
    /// retried here.
    async fn read(&self, selection: &PlaneSelection) -> Result<SampleBlock>;
}

/// Shared reference to an opened volume.
pub type ArrayHandle = Arc<dyn VolumeArray>;

/// Resolves dataset addresses to opened volumes.
#[async_trait]
pub trait VolumeStore: Send + Sync {
    /// Open the volume at `address`.
    async fn open(&self, address: &str) -> Result<ArrayHandle>;
}
