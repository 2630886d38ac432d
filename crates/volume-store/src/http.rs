//! HTTP backend for Zarr access.
//!
//! Builds an object_store HTTP client rooted at the dataset address and
//! adapts it to the synchronous zarrs storage API.

use std::sync::Arc;
use std::time::Duration;

use object_store::http::{HttpBuilder, HttpStore};
use object_store::ClientOptions;
use serde::{Deserialize, Serialize};
use zarrs_object_store::AsyncObjectStore;
use zarrs_storage::storage_adapter::async_to_sync::{
    AsyncToSyncBlockOn, AsyncToSyncStorageAdapter,
};

use crate::error::{Result, StoreError};
use crate::zarr::StorageConnector;

/// Drives store futures from the tokio blocking pool.
///
/// Volume reads run inside `spawn_blocking`, where blocking on the captured
/// runtime handle is allowed.
#[derive(Clone)]
pub struct HandleBlockOn(tokio::runtime::Handle);

impl AsyncToSyncBlockOn for HandleBlockOn {
    fn block_on<F: core::future::Future>(&self, future: F) -> F::Output {
        self.0.block_on(future)
    }
}

/// Client settings for the HTTP store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpStoreConfig {
    /// Allow plain `http://` addresses.
    pub allow_http: bool,
    /// Per-request timeout in seconds. A hung read fails with a read error
    /// once this elapses.
    pub request_timeout_secs: u64,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            allow_http: true,
            request_timeout_secs: 30,
        }
    }
}

impl HttpStoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("STORE_ALLOW_HTTP") {
            config.allow_http = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("STORE_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.request_timeout_secs = secs;
            }
        }

        config
    }
}

/// Storage type alias for HTTP-backed Zarr access (async).
pub type AsyncHttpStorage = AsyncObjectStore<HttpStore>;

/// Storage type alias for HTTP-backed Zarr access (sync adapter).
pub type HttpStorage = AsyncToSyncStorageAdapter<AsyncHttpStorage, HandleBlockOn>;

/// Connects to datasets served over HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpConnector {
    config: HttpStoreConfig,
}

impl HttpConnector {
    pub fn new(config: HttpStoreConfig) -> Self {
        Self { config }
    }
}

impl StorageConnector for HttpConnector {
    type Storage = HttpStorage;

    fn connect(&self, address: &str) -> Result<Arc<HttpStorage>> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| StoreError::open(address, format!("no tokio runtime: {}", e)))?;

        let options = ClientOptions::new()
            .with_allow_http(self.config.allow_http)
            .with_timeout(Duration::from_secs(self.config.request_timeout_secs));

        let http = HttpBuilder::new()
            .with_url(address)
            .with_client_options(options)
            .build()
            .map_err(|e| {
                StoreError::open(address, format!("failed to create HTTP client: {}", e))
            })?;

        let async_store = Arc::new(AsyncObjectStore::new(http));
        let sync_store = AsyncToSyncStorageAdapter::new(async_store, HandleBlockOn(handle));

        Ok(Arc::new(sync_store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpStoreConfig::default();
        assert!(config.allow_http);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_connect_requires_runtime() {
        let connector = HttpConnector::default();
        let err = connector
            .connect("http://localhost:1/zarr/F3/level_0/seismic")
            .err()
            .expect("connect outside a runtime must fail");
        assert!(err.is_open());
    }

    #[tokio::test]
    async fn test_connect_builds_client() {
        let connector = HttpConnector::default();
        assert!(connector
            .connect("http://localhost:1/zarr/F3/level_0/seismic")
            .is_ok());
    }
}
