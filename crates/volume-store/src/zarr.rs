//! Zarr volume implementation.

use std::sync::Arc;

use async_trait::async_trait;
use seismic_common::VolumeShape;
use zarrs::array::{Array, DataType};
use zarrs::array_subset::ArraySubset;
use zarrs::storage::ReadableStorageTraits;

use crate::error::{Result, StoreError};
use crate::types::{PlaneSelection, SampleBlock, SampleType};
use crate::volume::{ArrayHandle, VolumeArray, VolumeStore};

/// Builds a readable storage backend rooted at a dataset address.
pub trait StorageConnector: Send + Sync + 'static {
    type Storage: ReadableStorageTraits + Send + Sync + 'static;

    /// Connect to the store at `address`. Errors are reported as
    /// [`StoreError::Open`].
    fn connect(&self, address: &str) -> Result<Arc<Self::Storage>>;
}

/// Opens Zarr volumes through a [`StorageConnector`].
///
/// The array metadata lives at the root of each dataset address, so every
/// address gets its own storage instance.
pub struct ZarrVolumeStore<C: StorageConnector> {
    connector: C,
}

impl<C: StorageConnector> ZarrVolumeStore<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl<C: StorageConnector> VolumeStore for ZarrVolumeStore<C> {
    async fn open(&self, address: &str) -> Result<ArrayHandle> {
        let storage = self.connector.connect(address)?;

        let array = tokio::task::spawn_blocking(move || Array::open(storage, "/"))
            .await
            .map_err(|e| StoreError::open(address, format!("open task failed: {}", e)))?
            .map_err(|e| StoreError::open(address, e.to_string()))?;

        let volume = ZarrVolume::from_array(array, address)?;

        tracing::info!(
            address = %address,
            shape = ?volume.shape(),
            sample_type = %volume.sample_type(),
            "Opened seismic volume"
        );

        Ok(Arc::new(volume))
    }
}

/// A validated 3-axis Zarr volume.
pub struct ZarrVolume<S: ReadableStorageTraits> {
    array: Arc<Array<S>>,
    shape: VolumeShape,
    sample_type: SampleType,
}

impl<S: ReadableStorageTraits + Send + Sync + 'static> ZarrVolume<S> {
    /// Wrap an opened array, rejecting metadata this viewer cannot use.
    pub fn from_array(array: Array<S>, address: &str) -> Result<Self> {
        let shape = VolumeShape::from_dims(array.shape()).ok_or_else(|| {
            StoreError::open(
                address,
                format!(
                    "expected a 3-axis [inline, crossline, sample] array, got shape {:?}",
                    array.shape()
                ),
            )
        })?;

        let sample_type = match array.data_type() {
            DataType::Float32 => SampleType::Float32,
            DataType::Float64 => SampleType::Float64,
            DataType::Int8 => SampleType::Int8,
            DataType::Int16 => SampleType::Int16,
            DataType::Int32 => SampleType::Int32,
            DataType::UInt8 => SampleType::UInt8,
            DataType::UInt16 => SampleType::UInt16,
            other => {
                return Err(StoreError::open(
                    address,
                    format!("unsupported sample type {:?}", other),
                ))
            }
        };

        Ok(Self {
            array: Arc::new(array),
            shape,
            sample_type,
        })
    }

    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    /// Decode a selection, widening stored samples to `f32` (blocking).
    fn read_sync(
        array: &Array<S>,
        sample_type: SampleType,
        selection: &PlaneSelection,
    ) -> Result<SampleBlock> {
        let (start, shape) = selection.volume_subset();
        let subset = ArraySubset::new_with_start_shape(start.to_vec(), shape.to_vec())
            .map_err(|e| StoreError::read(e.to_string()))?;

        let samples: Vec<f32> = match sample_type {
            SampleType::Float32 => array
                .retrieve_array_subset_elements::<f32>(&subset)
                .map_err(|e| StoreError::read(e.to_string()))?,
            SampleType::Float64 => widen(array.retrieve_array_subset_elements::<f64>(&subset), |v| {
                v as f32
            })?,
            SampleType::Int8 => widen(array.retrieve_array_subset_elements::<i8>(&subset), f32::from)?,
            SampleType::Int16 => {
                widen(array.retrieve_array_subset_elements::<i16>(&subset), f32::from)?
            }
            SampleType::Int32 => widen(array.retrieve_array_subset_elements::<i32>(&subset), |v| {
                v as f32
            })?,
            SampleType::UInt8 => widen(array.retrieve_array_subset_elements::<u8>(&subset), f32::from)?,
            SampleType::UInt16 => {
                widen(array.retrieve_array_subset_elements::<u16>(&subset), f32::from)?
            }
        };

        SampleBlock::new(selection.rows(), selection.cols(), samples)
    }
}

fn widen<T, E: std::fmt::Display>(
    decoded: std::result::Result<Vec<T>, E>,
    convert: impl Fn(T) -> f32,
) -> Result<Vec<f32>> {
    decoded
        .map(|values| values.into_iter().map(convert).collect())
        .map_err(|e| StoreError::read(e.to_string()))
}

#[async_trait]
impl<S: ReadableStorageTraits + Send + Sync + 'static> VolumeArray for ZarrVolume<S> {
    fn shape(&self) -> VolumeShape {
        self.shape
    }

    async fn read(&self, selection: &PlaneSelection) -> Result<SampleBlock> {
        selection.check_bounds(&self.shape)?;

        let array = Arc::clone(&self.array);
        let sample_type = self.sample_type;
        let owned = selection.clone();

        tokio::task::spawn_blocking(move || Self::read_sync(&array, sample_type, &owned))
            .await
            .map_err(|e| StoreError::read(format!("read task failed: {}", e)))?
    }
}
