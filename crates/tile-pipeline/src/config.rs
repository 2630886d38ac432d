//! Configuration for the tile pipeline.

use serde::{Deserialize, Serialize};

use crate::planner::PlanPolicy;

/// Configuration for the tile pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root of the store; datasets live at
    /// `{api_root}/{dataset}/level_{level}/seismic`.
    pub api_root: String,

    /// Edge length of square tiles, in samples.
    pub tile_size: usize,

    /// Maximum number of tile reads in flight at once.
    pub max_concurrent_fetches: usize,

    /// Which tiles a generation fetches.
    pub plan_policy: PlanPolicy,

    /// Display with a vertical sample axis (tiles transposed).
    pub rotate: bool,

    /// Viewport width in pixels.
    pub viewport_width: usize,

    /// Viewport height in pixels.
    pub viewport_height: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_root: "http://localhost:8000/zarr".to_string(),
            tile_size: 256,
            max_concurrent_fetches: 16,
            plan_policy: PlanPolicy::ViewportCulled,
            rotate: false,
            viewport_width: 1024,
            viewport_height: 768,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SEISMIC_API_ROOT") {
            config.api_root = val;
        }

        if let Ok(val) = std::env::var("TILE_SIZE") {
            if let Ok(size) = val.parse() {
                config.tile_size = size;
            }
        }

        if let Ok(val) = std::env::var("MAX_CONCURRENT_FETCHES") {
            if let Ok(limit) = val.parse() {
                config.max_concurrent_fetches = limit;
            }
        }

        if let Ok(val) = std::env::var("PLAN_POLICY") {
            config.plan_policy = PlanPolicy::from_name(&val);
        }

        if let Ok(val) = std::env::var("ROTATE_TILES") {
            config.rotate = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("VIEWPORT_WIDTH") {
            if let Ok(width) = val.parse() {
                config.viewport_width = width;
            }
        }

        if let Ok(val) = std::env::var("VIEWPORT_HEIGHT") {
            if let Ok(height) = val.parse() {
                config.viewport_height = height;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_root.is_empty() {
            return Err("api_root must not be empty".to_string());
        }

        if self.tile_size == 0 {
            return Err("tile_size must be > 0".to_string());
        }

        if self.max_concurrent_fetches == 0 {
            return Err("max_concurrent_fetches must be > 0".to_string());
        }

        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err("viewport dimensions must be > 0".to_string());
        }

        Ok(())
    }
}
