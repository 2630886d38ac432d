//! Tile fetch/compose/render pipeline for seismic slices.
//!
//! Renders one slice plane of a remote chunked volume as a pannable,
//! zoomable raster without ever materializing the whole volume.
//!
//! # Architecture
//!
//! ```text
//! render(dataset, level, slice) / on_pan_zoom(event)
//!      │
//!      ├─► GenerationTracker::begin()   (cancels the previous generation)
//!      │
//!      ├─► open / reuse ArrayHandle, validate slice
//!      │
//!      ├─► TilePlanner::plan(policy, extent, visible region)
//!      │
//!      ├─► TileFetcher::dispatch()      (one task per tile, bounded)
//!      │         │
//!      │         └─► read ─► cancel check ─► local contrast stretch
//!      │
//!      ├─► composite each tile as it arrives (any order, one writer)
//!      │
//!      └─► MetricsAggregator::finish() ─► publish snapshot
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tile_pipeline::{PipelineConfig, SliceViewer};
//! use renderer::RgbaBuffer;
//! use seismic_common::SliceType;
//!
//! let viewer = SliceViewer::new(store, RgbaBuffer::new(), PipelineConfig::from_env())?;
//! let outcome = viewer.render("TNE01", 0, SliceType::Inline, 120).await?;
//! println!("{:?}", viewer.metrics());
//! ```

pub mod config;
pub mod error;
pub mod fetcher;
pub mod generation;
pub mod input;
pub mod metrics;
pub mod planner;
pub mod viewer;
pub mod viewport;

pub use config::PipelineConfig;
pub use error::{FetchError, RenderError};
pub use fetcher::{
    fetch_tile, read_full_slice, NormalizedTile, SliceStats, TileData, TileFetcher, TileOutcome,
};
pub use generation::{GenerationToken, GenerationTracker};
pub use input::{InputEvent, PanState, PanZoomController};
pub use self::metrics::{MetricsAggregator, MetricsPublisher, MetricsSnapshot};
pub use planner::{PlanPolicy, PlannedTile, TilePlan, TilePlanner};
pub use viewer::{RenderOutcome, SliceViewer};
pub use viewport::{ViewportTransform, ZoomDirection, MAX_ZOOM, MIN_ZOOM};
