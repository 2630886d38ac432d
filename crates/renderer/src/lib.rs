//! Pixel side of the slice viewer.
//!
//! - Local contrast stretch of raw tile samples to 0-255 intensities
//! - The host pixel surface contract and an in-memory RGBA implementation
//! - Compositing of grayscale tiles, optionally transposed
//! - PNG encoding of a finished buffer

pub mod compositor;
pub mod normalize;
pub mod png;
pub mod surface;

pub use compositor::composite;
pub use normalize::{normalize, SampleRange, FLAT_INTENSITY};
pub use surface::{RenderSurface, RgbaBuffer, SurfaceError, SurfaceTransform};
