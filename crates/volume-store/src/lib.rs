//! Access to remote chunked seismic volumes.
//!
//! A volume is a 3-axis Zarr array `[inline, crossline, sample]`. The viewer
//! only ever needs two operations from the store:
//!
//! - **open**: resolve a dataset address to an [`ArrayHandle`] of known shape
//! - **read**: fetch one sub-region of a slice plane, fixing one axis to a
//!   scalar and restricting the other two to half-open ranges
//!
//! # Architecture
//!
//! ```text
//! VolumeStore::open(address)
//!      │
//!      ├─► StorageConnector::connect(address)   (HTTP or filesystem)
//!      │
//!      ├─► zarrs Array::open (blocking pool)
//!      │
//!      └─► ZarrVolume (validated shape + sample type)
//!               │
//!               ▼
//!      VolumeArray::read(selection) ──► SampleBlock (f32, row-major)
//! ```
//!
//! Zarr decoding is synchronous, so every store call runs on the tokio
//! blocking pool and the async caller only suspends on the join.

pub mod error;
pub mod filesystem;
pub mod http;
pub mod types;
pub mod volume;
pub mod zarr;

pub use error::{Result, StoreError};
pub use filesystem::FilesystemConnector;
pub use http::{HttpConnector, HttpStoreConfig};
pub use types::{PlaneSelection, SampleBlock, SampleType};
pub use volume::{ArrayHandle, VolumeArray, VolumeStore};
pub use zarr::{StorageConnector, ZarrVolume, ZarrVolumeStore};
