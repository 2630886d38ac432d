//! Local contrast stretch.
//!
//! Each tile is stretched with its own min/max, so neighbouring tiles may
//! show seams. Non-finite samples are ignored for the range and render as 0.

/// Intensity of every sample in a tile whose min equals its max.
pub const FLAT_INTENSITY: u8 = 128;

/// Min/max of the finite samples of one tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRange {
    pub min: f32,
    pub max: f32,
}

impl SampleRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Scan a tile. Returns `None` when it holds no finite sample.
    pub fn of(samples: &[f32]) -> Option<Self> {
        samples
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |range, v| match range {
                None => Some(Self::new(v, v)),
                Some(r) => Some(Self::new(r.min.min(v), r.max.max(v))),
            })
    }

    /// True when the range cannot be stretched (`max <= min`).
    pub fn is_degenerate(&self) -> bool {
        !(self.max > self.min)
    }
}

/// Map samples to `floor((v - min) / (max - min) * 255)`.
///
/// A degenerate or missing range yields [`FLAT_INTENSITY`] everywhere.
pub fn normalize(samples: &[f32], range: Option<SampleRange>) -> Vec<u8> {
    let range = match range {
        Some(r) if !r.is_degenerate() => r,
        _ => return vec![FLAT_INTENSITY; samples.len()],
    };

    let min = range.min as f64;
    let span = range.max as f64 - min;

    samples
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                return 0;
            }
            // Multiply before dividing so exact ratios stay exact
            let scaled = ((v as f64 - min) * 255.0 / span).floor();
            scaled.clamp(0.0, 255.0) as u8
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_by_two_tile() {
        let samples = [1.0, 2.0, 3.0, 4.0];
        let range = SampleRange::of(&samples);
        assert_eq!(range, Some(SampleRange::new(1.0, 4.0)));
        assert_eq!(normalize(&samples, range), vec![0, 85, 170, 255]);
    }

    #[test]
    fn test_constant_tile_is_flat() {
        let samples = [7.5; 16];
        let range = SampleRange::of(&samples).unwrap();
        assert!(range.is_degenerate());
        assert_eq!(normalize(&samples, Some(range)), vec![FLAT_INTENSITY; 16]);
    }

    #[test]
    fn test_non_finite_samples() {
        let samples = [f32::NAN, -1.0, 1.0, f32::INFINITY];
        let range = SampleRange::of(&samples);
        assert_eq!(range, Some(SampleRange::new(-1.0, 1.0)));
        assert_eq!(normalize(&samples, range), vec![0, 0, 255, 0]);

        let all_nan = [f32::NAN; 4];
        assert_eq!(SampleRange::of(&all_nan), None);
        assert_eq!(normalize(&all_nan, None), vec![FLAT_INTENSITY; 4]);
    }

    #[test]
    fn test_negative_amplitudes() {
        let samples = [-2.0, 0.0, 2.0];
        let out = normalize(&samples, SampleRange::of(&samples));
        assert_eq!(out, vec![0, 127, 255]);
    }
}
