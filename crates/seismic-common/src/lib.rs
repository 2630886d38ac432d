//! Common types shared by the seismic slice viewer crates.
//!
//! The remote volume is a 3-axis array ordered `[inline, crossline, sample]`.
//! Fixing the inline or crossline axis yields a 2D plane whose horizontal
//! axis is always the sample axis.

pub mod address;
pub mod error;
pub mod slice;
pub mod tile;

pub use address::dataset_address;
pub use error::SliceError;
pub use slice::{PlaneExtent, SliceSpec, SliceType, VolumeShape};
pub use tile::{ArrayRegion, TileCoord, TileWindow};
