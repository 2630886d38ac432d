//! Local filesystem backend, for mirrored datasets and tests.

use std::sync::Arc;

use zarrs_filesystem::FilesystemStore;

use crate::error::{Result, StoreError};
use crate::zarr::StorageConnector;

/// Treats each dataset address as a local directory path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemConnector;

impl StorageConnector for FilesystemConnector {
    type Storage = FilesystemStore;

    fn connect(&self, address: &str) -> Result<Arc<FilesystemStore>> {
        let path = std::path::Path::new(address);
        if !path.is_dir() {
            return Err(StoreError::open(address, "no such dataset directory"));
        }

        FilesystemStore::new(path)
            .map(Arc::new)
            .map_err(|e| StoreError::open(address, e.to_string()))
    }
}
