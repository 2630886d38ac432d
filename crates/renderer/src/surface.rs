//! Host pixel surface contract and the in-memory RGBA buffer.

use thiserror::Error;

/// Errors from writing to a surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// The block does not fit inside the allocated buffer.
    #[error("block {width}x{height} at ({x}, {y}) exceeds surface {surface_width}x{surface_height}")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        surface_width: usize,
        surface_height: usize,
    },

    /// The RGBA slice length does not match the block dimensions.
    #[error("expected {expected} RGBA bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Presentation transform the host applies when drawing the buffer:
/// uniform scale, then translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for SurfaceTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

/// Pixel buffer API of the host rendering surface.
pub trait RenderSurface: Send {
    /// Allocate a `width x height` buffer, discarding previous contents.
    /// Every pixel starts as the transparent background.
    fn allocate(&mut self, width: usize, height: usize);

    /// Write a row-major RGBA block with its top-left corner at `(x, y)`.
    fn write_rgba_block(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        rgba: &[u8],
    ) -> Result<(), SurfaceError>;

    /// Set the scale/translate transform used to present the buffer.
    fn set_transform(&mut self, transform: SurfaceTransform);

    /// Replace the render area with an error indicator.
    fn show_error(&mut self, message: &str);
}

/// In-memory RGBA surface.
#[derive(Debug, Clone, Default)]
pub struct RgbaBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    transform: SurfaceTransform,
    error: Option<String>,
}

impl RgbaBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        Some([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ])
    }

    /// Number of pixels that have been painted (non-zero alpha).
    pub fn painted_pixels(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|p| p[3] != 0).count()
    }

    pub fn transform(&self) -> SurfaceTransform {
        self.transform
    }

    /// Message of the error indicator, if one is shown.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Encode the buffer as an RGBA PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, String> {
        crate::png::create_png(&self.pixels, self.width, self.height)
    }
}

impl RenderSurface for RgbaBuffer {
    fn allocate(&mut self, width: usize, height: usize) {
        tracing::trace!(width, height, "Allocating pixel buffer");
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height * 4, 0);
        self.error = None;
    }

    fn write_rgba_block(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        rgba: &[u8],
    ) -> Result<(), SurfaceError> {
        if rgba.len() != width * height * 4 {
            return Err(SurfaceError::SizeMismatch {
                expected: width * height * 4,
                actual: rgba.len(),
            });
        }
        if x + width > self.width || y + height > self.height {
            return Err(SurfaceError::OutOfBounds {
                x,
                y,
                width,
                height,
                surface_width: self.width,
                surface_height: self.height,
            });
        }

        let row_bytes = width * 4;
        for row in 0..height {
            let dst = ((y + row) * self.width + x) * 4;
            let src = row * row_bytes;
            self.pixels[dst..dst + row_bytes].copy_from_slice(&rgba[src..src + row_bytes]);
        }
        Ok(())
    }

    fn set_transform(&mut self, transform: SurfaceTransform) {
        self.transform = transform;
    }

    fn show_error(&mut self, message: &str) {
        self.pixels.iter_mut().for_each(|b| *b = 0);
        self.error = Some(message.to_string());
    }
}
