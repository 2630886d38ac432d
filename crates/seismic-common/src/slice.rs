//! Volume shape and slice selection.

use serde::{Deserialize, Serialize};

use crate::error::SliceError;

/// Which axis a slice fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceType {
    Inline,
    Crossline,
}

impl SliceType {
    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "inline" | "il" => Some(Self::Inline),
            "crossline" | "xl" => Some(Self::Crossline),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Crossline => "crossline",
        }
    }
}

impl std::fmt::Display for SliceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shape of an opened volume: `[n_inline, n_crossline, n_sample]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeShape {
    pub inlines: u64,
    pub crosslines: u64,
    pub samples: u64,
}

impl VolumeShape {
    pub fn new(inlines: u64, crosslines: u64, samples: u64) -> Self {
        Self {
            inlines,
            crosslines,
            samples,
        }
    }

    /// Build from a raw array shape, which must have exactly three axes.
    pub fn from_dims(dims: &[u64]) -> Option<Self> {
        match dims {
            [inlines, crosslines, samples] => Some(Self::new(*inlines, *crosslines, *samples)),
            _ => None,
        }
    }

    /// Extent of the axis fixed by `slice_type`.
    pub fn axis_extent(&self, slice_type: SliceType) -> u64 {
        match slice_type {
            SliceType::Inline => self.inlines,
            SliceType::Crossline => self.crosslines,
        }
    }
}

/// Dimensions of the 2D plane left after fixing one axis.
///
/// `width` runs along the sample axis, `height` along the non-fixed
/// trace axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaneExtent {
    pub width: usize,
    pub height: usize,
}

impl PlaneExtent {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn sample_count(&self) -> usize {
        self.width * self.height
    }

    /// Swap the axes (display extent of a rotated plane).
    pub fn transposed(&self) -> Self {
        Self::new(self.height, self.width)
    }
}

/// One fixed axis of the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SliceSpec {
    pub slice_type: SliceType,
    pub slice_number: u64,
}

impl SliceSpec {
    pub fn new(slice_type: SliceType, slice_number: u64) -> Self {
        Self {
            slice_type,
            slice_number,
        }
    }

    pub fn inline(slice_number: u64) -> Self {
        Self::new(SliceType::Inline, slice_number)
    }

    pub fn crossline(slice_number: u64) -> Self {
        Self::new(SliceType::Crossline, slice_number)
    }

    /// Check the slice against a volume and return the plane it selects.
    ///
    /// Out-of-range slice numbers are rejected, never clamped.
    pub fn plane_extent(&self, shape: &VolumeShape) -> Result<PlaneExtent, SliceError> {
        let extent = shape.axis_extent(self.slice_type);
        if self.slice_number >= extent {
            return Err(SliceError::out_of_range(
                self.slice_type,
                self.slice_number,
                extent,
            ));
        }

        let height = match self.slice_type {
            SliceType::Inline => shape.crosslines,
            SliceType::Crossline => shape.inlines,
        };
        Ok(PlaneExtent::new(shape.samples as usize, height as usize))
    }
}

impl std::fmt::Display for SliceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.slice_type, self.slice_number)
    }
}
