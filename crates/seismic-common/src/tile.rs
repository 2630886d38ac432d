//! Tile grid coordinates and the sample windows they cover.

use serde::{Deserialize, Serialize};

use crate::slice::PlaneExtent;

/// A tile index in the plane's tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column along the sample axis.
    pub tx: u32,
    /// Row along the trace axis.
    pub ty: u32,
}

impl TileCoord {
    pub fn new(tx: u32, ty: u32) -> Self {
        Self { tx, ty }
    }

    /// Sample-space window of this tile, clipped to the plane.
    ///
    /// Returns `None` when the tile lies entirely outside the plane.
    pub fn window(&self, extent: &PlaneExtent, tile_size: usize) -> Option<TileWindow> {
        let x0 = self.tx as usize * tile_size;
        let y0 = self.ty as usize * tile_size;
        if x0 >= extent.width || y0 >= extent.height {
            return None;
        }

        Some(TileWindow {
            x0,
            x1: (x0 + tile_size).min(extent.width),
            y0,
            y1: (y0 + tile_size).min(extent.height),
        })
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.tx, self.ty)
    }
}

/// Half-open sample bounds of a tile: `x0..x1` along samples, `y0..y1`
/// along traces. Always non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileWindow {
    pub x0: usize,
    pub x1: usize,
    pub y0: usize,
    pub y1: usize,
}

impl TileWindow {
    pub fn width(&self) -> usize {
        self.x1 - self.x0
    }

    pub fn height(&self) -> usize {
        self.y1 - self.y0
    }

    pub fn sample_count(&self) -> usize {
        self.width() * self.height()
    }

    /// Check whether the sample `(x, y)` falls inside this window.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

/// A rectangle in continuous array (sample) space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrayRegion {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl ArrayRegion {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// The whole plane.
    pub fn full(extent: &PlaneExtent) -> Self {
        Self::new(0.0, 0.0, extent.width as f64, extent.height as f64)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// True when the region covers no area.
    pub fn is_empty(&self) -> bool {
        !(self.x1 > self.x0 && self.y1 > self.y0)
    }

    /// Swap the axes.
    pub fn transposed(&self) -> Self {
        Self::new(self.y0, self.x0, self.y1, self.x1)
    }

    /// Clamp to `[0, width] x [0, height]` of the plane.
    pub fn clamp_to(&self, extent: &PlaneExtent) -> Self {
        let w = extent.width as f64;
        let h = extent.height as f64;
        Self {
            x0: self.x0.clamp(0.0, w),
            y0: self.y0.clamp(0.0, h),
            x1: self.x1.clamp(0.0, w),
            y1: self.y1.clamp(0.0, h),
        }
    }
}
