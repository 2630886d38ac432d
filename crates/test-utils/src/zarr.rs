//! Writers for on-disk Zarr V3 test volumes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use zarrs::array::{ArrayBuilder, DataType, FillValue};
use zarrs::array_subset::ArraySubset;
use zarrs_filesystem::FilesystemStore;

use crate::fixtures::FIXTURE_CHUNKS;

/// Write a float32 volume (no sharding, no compression) to `path`.
pub fn write_zarr_volume(
    path: &Path,
    shape: [u64; 3],
    chunks: [u64; 3],
    data: &[f32],
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(path)?;
    let store = Arc::new(FilesystemStore::new(path)?);

    let array = ArrayBuilder::new(
        shape.to_vec(),
        DataType::Float32,
        chunks.to_vec().try_into()?,
        FillValue::from(0.0f32),
    )
    .build(store, "/")?;

    array.store_metadata()?;

    let subset = ArraySubset::new_with_start_shape(vec![0, 0, 0], shape.to_vec())?;
    array.store_array_subset_elements(&subset, data)?;

    Ok(())
}

/// Write an int16 volume, the common storage type for field recordings.
pub fn write_zarr_volume_i16(
    path: &Path,
    shape: [u64; 3],
    chunks: [u64; 3],
    data: &[i16],
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(path)?;
    let store = Arc::new(FilesystemStore::new(path)?);

    let array = ArrayBuilder::new(
        shape.to_vec(),
        DataType::Int16,
        chunks.to_vec().try_into()?,
        FillValue::from(0i16),
    )
    .build(store, "/")?;

    array.store_metadata()?;

    let subset = ArraySubset::new_with_start_shape(vec![0, 0, 0], shape.to_vec())?;
    array.store_array_subset_elements(&subset, data)?;

    Ok(())
}

/// Path of a dataset level under a store root, matching the store layout
/// `{root}/{dataset}/level_{level}/seismic`.
pub fn dataset_level_path(root: &Path, dataset: &str, level: u32) -> PathBuf {
    root.join(dataset)
        .join(format!("level_{}", level))
        .join("seismic")
}

/// Write a float32 volume at the dataset level location under `root`.
pub fn write_dataset_level(
    root: &Path,
    dataset: &str,
    level: u32,
    shape: [u64; 3],
    data: &[f32],
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dataset_level_path(root, dataset, level);
    write_zarr_volume(&path, shape, FIXTURE_CHUNKS, data)?;
    Ok(path)
}

/// Write a [`create_test_volume`](crate::create_test_volume) volume into a
/// fresh temp directory. Returns the directory (the store root) and the
/// dataset level path.
pub fn temp_dataset(
    dataset: &str,
    level: u32,
    shape: [u64; 3],
) -> Result<(tempfile::TempDir, PathBuf), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let data = crate::create_test_volume(shape);
    let path = write_dataset_level(dir.path(), dataset, level, shape, &data)?;
    Ok((dir, path))
}

/// Write a plain 2D array, used to exercise shape validation.
pub fn write_zarr_plane(
    path: &Path,
    rows: u64,
    cols: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(path)?;
    let store = Arc::new(FilesystemStore::new(path)?);

    let array = ArrayBuilder::new(
        vec![rows, cols],
        DataType::Float32,
        vec![rows, cols].try_into()?,
        FillValue::from(0.0f32),
    )
    .build(store, "/")?;

    array.store_metadata()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_level_path_layout() {
        let path = dataset_level_path(Path::new("/data"), "TNE01", 1);
        assert_eq!(path, PathBuf::from("/data/TNE01/level_1/seismic"));
    }

    #[test]
    fn test_temp_dataset_writes_metadata() {
        let (dir, path) = temp_dataset("TNE01", 0, crate::TINY_VOLUME).unwrap();
        assert!(path.starts_with(dir.path()));
        assert!(path.join("zarr.json").is_file());
    }
}
