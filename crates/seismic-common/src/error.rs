//! Caller contract violations detected before any fetch.

use thiserror::Error;

use crate::slice::SliceType;

/// A slice selection that does not exist in the opened volume.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SliceError {
    /// The slice number is at or beyond the extent of the fixed axis.
    #[error("{slice_type} slice {slice_number} is out of range (axis extent {extent})")]
    OutOfRange {
        slice_type: SliceType,
        slice_number: u64,
        extent: u64,
    },
}

impl SliceError {
    /// Create an OutOfRange error.
    pub fn out_of_range(slice_type: SliceType, slice_number: u64, extent: u64) -> Self {
        Self::OutOfRange {
            slice_type,
            slice_number,
            extent,
        }
    }
}
