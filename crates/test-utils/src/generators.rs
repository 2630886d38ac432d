//! Test data generators for synthetic seismic volumes.
//!
//! These generators create predictable, verifiable sample patterns
//! that can be used across the test suite.

/// Value stored at `(inline, crossline, sample)` by [`create_test_volume`].
///
/// `inline * 1_000_000 + crossline * 1000 + sample`, exact in `f32` for the
/// fixture sizes used here.
pub fn test_sample_value(inline: u64, crossline: u64, sample: u64) -> f32 {
    (inline * 1_000_000 + crossline * 1000 + sample) as f32
}

/// Creates a test volume with predictable values.
///
/// # Returns
///
/// A `Vec<f32>` in C order over `[inline, crossline, sample]`.
///
/// # Example
///
/// ```
/// use test_utils::create_test_volume;
///
/// let volume = create_test_volume([2, 3, 4]);
/// assert_eq!(volume.len(), 24);
/// assert_eq!(volume[1], 1.0);          // sample 1
/// assert_eq!(volume[4], 1000.0);       // crossline 1
/// assert_eq!(volume[12], 1_000_000.0); // inline 1
/// ```
pub fn create_test_volume(shape: [u64; 3]) -> Vec<f32> {
    let [inlines, crosslines, samples] = shape;
    let mut data = Vec::with_capacity((inlines * crosslines * samples) as usize);
    for il in 0..inlines {
        for xl in 0..crosslines {
            for s in 0..samples {
                data.push(test_sample_value(il, xl, s));
            }
        }
    }
    data
}

/// Creates a seismic-like volume: a damped wavelet that repeats down each
/// trace, shifted slightly per crossline, with amplitudes in about ±1.
pub fn create_wavelet_volume(shape: [u64; 3]) -> Vec<f32> {
    let [inlines, crosslines, samples] = shape;
    let mut data = Vec::with_capacity((inlines * crosslines * samples) as usize);
    for il in 0..inlines {
        for xl in 0..crosslines {
            let shift = (il + xl) as f32 * 0.15;
            for s in 0..samples {
                let t = s as f32 * 0.2 + shift;
                let envelope = (-(s as f32) / samples.max(1) as f32).exp();
                data.push(t.sin() * envelope);
            }
        }
    }
    data
}

/// Creates a plane of `rows x cols` samples with a single constant value.
pub fn create_constant_plane(rows: usize, cols: usize, value: f32) -> Vec<f32> {
    vec![value; rows * cols]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_layout() {
        let volume = create_test_volume([3, 4, 5]);
        assert_eq!(volume.len(), 60);
        // Index = (il * 4 + xl) * 5 + s
        assert_eq!(volume[(2 * 4 + 3) * 5 + 4], test_sample_value(2, 3, 4));
    }

    #[test]
    fn test_wavelet_volume_bounded() {
        let volume = create_wavelet_volume([2, 3, 64]);
        assert!(volume.iter().all(|v| v.abs() <= 1.0));
    }
}
