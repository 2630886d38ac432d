//! Writes normalized tiles into a surface.
//!
//! Tiles own disjoint destination pixels, so the composite is independent
//! of the order tiles arrive in.

use seismic_common::TileWindow;

use crate::surface::{RenderSurface, SurfaceError};

/// Write one grayscale tile as opaque RGBA (`R = G = B = intensity`).
///
/// `intensities` is row-major over the window (`height` traces of `width`
/// samples). With `rotate`, the tile is transposed: tile sample
/// `(row, col)` lands at block position `(col, row)` and the block is placed
/// at `(y0, x0)`, giving a vertical sample axis. A render must use the same
/// `rotate` for every tile.
pub fn composite<S: RenderSurface + ?Sized>(
    surface: &mut S,
    window: &TileWindow,
    intensities: &[u8],
    rotate: bool,
) -> Result<(), SurfaceError> {
    let (w, h) = (window.width(), window.height());
    if intensities.len() != w * h {
        return Err(SurfaceError::SizeMismatch {
            expected: w * h * 4,
            actual: intensities.len() * 4,
        });
    }

    let mut block = vec![0u8; w * h * 4];

    if rotate {
        // Block is h wide and w tall
        for row in 0..h {
            for col in 0..w {
                let v = intensities[row * w + col];
                let idx = (col * h + row) * 4;
                block[idx..idx + 4].copy_from_slice(&[v, v, v, 255]);
            }
        }
        surface.write_rgba_block(window.y0, window.x0, h, w, &block)
    } else {
        for (px, &v) in block.chunks_exact_mut(4).zip(intensities) {
            px.copy_from_slice(&[v, v, v, 255]);
        }
        surface.write_rgba_block(window.x0, window.y0, w, h, &block)
    }
}
