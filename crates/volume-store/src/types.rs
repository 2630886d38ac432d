//! Read requests and their results.

use std::ops::Range;

use seismic_common::{SliceSpec, SliceType, TileWindow, VolumeShape};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Axis selectors for one read: the slice fixes one axis to a scalar, the
/// trace and sample axes are restricted to half-open ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneSelection {
    pub slice: SliceSpec,
    /// Range along the non-fixed trace axis (plane rows).
    pub traces: Range<u64>,
    /// Range along the sample axis (plane columns).
    pub samples: Range<u64>,
}

impl PlaneSelection {
    pub fn new(slice: SliceSpec, traces: Range<u64>, samples: Range<u64>) -> Self {
        Self {
            slice,
            traces,
            samples,
        }
    }

    /// Selection covering one tile window of the slice plane.
    pub fn for_window(slice: SliceSpec, window: &TileWindow) -> Self {
        Self::new(
            slice,
            window.y0 as u64..window.y1 as u64,
            window.x0 as u64..window.x1 as u64,
        )
    }

    pub fn rows(&self) -> usize {
        (self.traces.end.saturating_sub(self.traces.start)) as usize
    }

    pub fn cols(&self) -> usize {
        (self.samples.end.saturating_sub(self.samples.start)) as usize
    }

    /// Start and shape of the selection in volume axis order
    /// `[inline, crossline, sample]`.
    pub fn volume_subset(&self) -> ([u64; 3], [u64; 3]) {
        let n = self.slice.slice_number;
        let rows = self.rows() as u64;
        let cols = self.cols() as u64;
        match self.slice.slice_type {
            SliceType::Inline => (
                [n, self.traces.start, self.samples.start],
                [1, rows, cols],
            ),
            SliceType::Crossline => (
                [self.traces.start, n, self.samples.start],
                [rows, 1, cols],
            ),
        }
    }

    /// Reject empty ranges and anything outside the volume.
    pub fn check_bounds(&self, shape: &VolumeShape) -> Result<()> {
        if self.rows() == 0 || self.cols() == 0 {
            return Err(StoreError::read(format!("empty selection {:?}", self)));
        }

        let (start, extent) = self.volume_subset();
        let dims = [shape.inlines, shape.crosslines, shape.samples];
        for axis in 0..3 {
            if start[axis] + extent[axis] > dims[axis] {
                return Err(StoreError::read(format!(
                    "selection {:?} exceeds volume shape {:?}",
                    self, shape
                )));
            }
        }
        Ok(())
    }
}

/// Raw samples of one read, row-major (`rows` traces of `cols` samples).
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBlock {
    pub rows: usize,
    pub cols: usize,
    pub samples: Vec<f32>,
}

impl SampleBlock {
    pub fn new(rows: usize, cols: usize, samples: Vec<f32>) -> Result<Self> {
        if samples.len() != rows * cols {
            return Err(StoreError::read(format!(
                "decoded {} samples for a {}x{} block",
                samples.len(),
                rows,
                cols
            )));
        }
        Ok(Self {
            rows,
            cols,
            samples,
        })
    }

    /// Sample at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.samples.get(row * self.cols + col).copied()
    }
}

/// Stored sample types the viewer can widen to `f32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleType {
    Float32,
    Float64,
    Int8,
    Int16,
    Int32,
    UInt8,
    UInt16,
}

impl SampleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
        }
    }
}

impl std::fmt::Display for SampleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
