//! PNG encoding for RGBA snapshots of the pixel buffer.
//!
//! Produces 8-bit RGBA (color type 6) images with the `Up` scanline filter,
//! which compresses well on seismic sections whose traces change slowly
//! from row to row.

use std::io::Write;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// PNG filter type 2: each byte minus the byte above it.
const FILTER_UP: u8 = 2;

/// Create an RGBA PNG.
///
/// # Arguments
/// - `pixels`: RGBA pixel data (4 bytes per pixel), row-major
/// - `width`: Image width in pixels
/// - `height`: Image height in pixels
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, String> {
    if width == 0 || height == 0 {
        return Err(format!("cannot encode an empty {}x{} image", width, height));
    }
    if pixels.len() != width * height * 4 {
        return Err(format!(
            "expected {} RGBA bytes for {}x{}, got {}",
            width * height * 4,
            width,
            height,
            pixels.len()
        ));
    }

    let mut png = Vec::with_capacity(pixels.len() / 2 + 64);
    png.extend_from_slice(&SIGNATURE);

    let mut header = Vec::with_capacity(13);
    header.extend_from_slice(&(width as u32).to_be_bytes());
    header.extend_from_slice(&(height as u32).to_be_bytes());
    // bit depth 8, RGBA, deflate, adaptive filtering, no interlace
    header.extend_from_slice(&[8, 6, 0, 0, 0]);
    push_chunk(&mut png, b"IHDR", &header);

    let idat = compress_scanlines(pixels, width * 4)
        .map_err(|e| format!("IDAT compression failed: {}", e))?;
    push_chunk(&mut png, b"IDAT", &idat);

    push_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Append a length-prefixed, CRC-terminated chunk.
fn push_chunk(png: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());

    let mut crc = crc32fast::Hasher::new();
    crc.update(kind);
    crc.update(data);

    png.extend_from_slice(kind);
    png.extend_from_slice(data);
    png.extend_from_slice(&crc.finalize().to_be_bytes());
}

/// Filter every scanline with `Up` and deflate the result.
fn compress_scanlines(pixels: &[u8], stride: usize) -> std::io::Result<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    let mut filtered = vec![0u8; stride + 1];
    filtered[0] = FILTER_UP;

    let mut previous: Option<&[u8]> = None;
    for row in pixels.chunks_exact(stride) {
        match previous {
            Some(above) => {
                for (out, (&cur, &up)) in filtered[1..].iter_mut().zip(row.iter().zip(above)) {
                    *out = cur.wrapping_sub(up);
                }
            }
            // The row above the first scanline is all zeros
            None => filtered[1..].copy_from_slice(row),
        }
        encoder.write_all(&filtered)?;
        previous = Some(row);
    }

    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    /// Undo the Up filter on decompressed IDAT bytes.
    fn unfilter(raw: &[u8], stride: usize) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::with_capacity(raw.len());
        for (i, line) in raw.chunks_exact(stride + 1).enumerate() {
            assert_eq!(line[0], FILTER_UP);
            for (j, &b) in line[1..].iter().enumerate() {
                let up = if i == 0 { 0 } else { out[(i - 1) * stride + j] };
                out.push(b.wrapping_add(up));
            }
        }
        out
    }

    #[test]
    fn test_png_structure() {
        let pixels = vec![255u8; 3 * 2 * 4];
        let png = create_png(&pixels, 3, 2).unwrap();

        assert_eq!(&png[..8], &SIGNATURE);
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(u32::from_be_bytes(png[16..20].try_into().unwrap()), 3);
        assert_eq!(u32::from_be_bytes(png[20..24].try_into().unwrap()), 2);
        assert_eq!(png[25], 6);
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }

    #[test]
    fn test_idat_roundtrip() {
        let (w, h) = (4, 3);
        let pixels: Vec<u8> = (0..w * h * 4).map(|i| (i * 37 % 251) as u8).collect();
        let png = create_png(&pixels, w, h).unwrap();

        // IHDR occupies 8 + 25 bytes, IDAT follows
        let idat_start = 8 + 25;
        let len = u32::from_be_bytes(png[idat_start..idat_start + 4].try_into().unwrap()) as usize;
        assert_eq!(&png[idat_start + 4..idat_start + 8], b"IDAT");
        let data = &png[idat_start + 8..idat_start + 8 + len];

        let mut raw = Vec::new();
        flate2::read::ZlibDecoder::new(data)
            .read_to_end(&mut raw)
            .unwrap();
        assert_eq!(unfilter(&raw, w * 4), pixels);
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        assert!(create_png(&[], 0, 0).is_err());
        assert!(create_png(&[0; 12], 2, 2).is_err());
    }
}
