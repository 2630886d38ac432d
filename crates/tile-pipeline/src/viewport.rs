//! Zoom and pan state of the viewport.
//!
//! Viewport pixel `(vx, vy)` shows array sample
//! `((vx - offset_x) / zoom, (vy - offset_y) / zoom)`.

use renderer::SurfaceTransform;
use seismic_common::{ArrayRegion, PlaneExtent};
use serde::{Deserialize, Serialize};

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.2;

/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 5.0;

const ZOOM_IN_FACTOR: f64 = 1.1;
const ZOOM_OUT_FACTOR: f64 = 0.9;

/// Direction of one wheel step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Wheel scrolled up (negative delta) zooms in, anything else out.
    pub fn from_wheel_delta(delta_y: f64) -> Self {
        if delta_y < 0.0 {
            Self::In
        } else {
            Self::Out
        }
    }

    fn factor(&self) -> f64 {
        match self {
            Self::In => ZOOM_IN_FACTOR,
            Self::Out => ZOOM_OUT_FACTOR,
        }
    }
}

/// Zoom factor and pan offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    pub zoom: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl ViewportTransform {
    /// Create a transform; zoom is clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn new(zoom: f64, offset_x: f64, offset_y: f64) -> Self {
        Self {
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            offset_x,
            offset_y,
        }
    }

    /// Map a viewport pixel to array coordinates.
    pub fn to_array_coords(&self, viewport_x: f64, viewport_y: f64) -> (f64, f64) {
        (
            (viewport_x - self.offset_x) / self.zoom,
            (viewport_y - self.offset_y) / self.zoom,
        )
    }

    /// Map array coordinates to a viewport pixel.
    pub fn to_viewport_coords(&self, array_x: f64, array_y: f64) -> (f64, f64) {
        (
            array_x * self.zoom + self.offset_x,
            array_y * self.zoom + self.offset_y,
        )
    }

    /// The part of a plane visible in a `viewport_width x viewport_height`
    /// viewport, clamped to the plane. Empty when panned off the plane.
    pub fn visible_array_region(
        &self,
        viewport_width: usize,
        viewport_height: usize,
        extent: &PlaneExtent,
    ) -> ArrayRegion {
        let (x0, y0) = self.to_array_coords(0.0, 0.0);
        let (x1, y1) = self.to_array_coords(viewport_width as f64, viewport_height as f64);
        ArrayRegion::new(x0, y0, x1, y1).clamp_to(extent)
    }

    /// Apply one wheel step. Returns false when the zoom is already pinned
    /// at the bound in that direction.
    pub fn zoom_step(&mut self, direction: ZoomDirection) -> bool {
        let zoom = (self.zoom * direction.factor()).clamp(MIN_ZOOM, MAX_ZOOM);
        let changed = zoom != self.zoom;
        self.zoom = zoom;
        changed
    }

    /// Move the offset by a pointer delta. Unbounded.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// The scale/translate the host applies when presenting the buffer.
    pub fn surface_transform(&self) -> SurfaceTransform {
        SurfaceTransform {
            scale: self.zoom,
            translate_x: self.offset_x,
            translate_y: self.offset_y,
        }
    }
}
