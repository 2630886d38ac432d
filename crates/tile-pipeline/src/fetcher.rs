//! Tile fetching.
//!
//! One task per planned tile, admitted through a shared semaphore so a plan
//! of hundreds of tiles never has more than `limit` reads in flight. Each
//! task checks its generation token after every suspension point and skips
//! normalization when the generation has been superseded.

use std::sync::Arc;
use std::time::{Duration, Instant};

use renderer::{normalize, SampleRange};
use seismic_common::{PlaneExtent, SliceSpec, TileCoord, TileWindow};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use volume_store::{ArrayHandle, PlaneSelection, StoreError, VolumeArray};

use crate::error::{FetchError, RenderError};
use crate::generation::GenerationToken;
use crate::planner::TilePlan;

/// Raw samples of one tile window with their own range.
#[derive(Debug, Clone)]
pub struct TileData {
    pub coord: TileCoord,
    pub window: TileWindow,
    /// Row-major, `window.height()` rows of `window.width()` samples.
    pub samples: Vec<f32>,
    pub range: Option<SampleRange>,
    /// Time spent in the remote read.
    pub elapsed: Duration,
}

impl TileData {
    /// Apply the local contrast stretch, consuming the raw samples.
    pub fn normalize(self) -> NormalizedTile {
        NormalizedTile {
            coord: self.coord,
            window: self.window,
            intensities: normalize(&self.samples, self.range),
            fetch_time: self.elapsed,
        }
    }
}

/// A tile ready for compositing.
#[derive(Debug, Clone)]
pub struct NormalizedTile {
    pub coord: TileCoord,
    pub window: TileWindow,
    pub intensities: Vec<u8>,
    pub fetch_time: Duration,
}

/// How one tile task settled.
#[derive(Debug)]
pub enum TileOutcome {
    Ready(NormalizedTile),
    Failed(FetchError),
    /// The generation was superseded before the tile could be used.
    Skipped(TileCoord),
}

/// Read one tile window of a slice.
pub async fn fetch_tile(
    handle: &dyn VolumeArray,
    slice: SliceSpec,
    coord: TileCoord,
    window: TileWindow,
) -> Result<TileData, FetchError> {
    let selection = PlaneSelection::for_window(slice, &window);

    let start = Instant::now();
    let block = handle
        .read(&selection)
        .await
        .map_err(|e| FetchError::new(coord, e))?;
    let elapsed = start.elapsed();

    if block.rows != window.height() || block.cols != window.width() {
        return Err(FetchError::new(
            coord,
            StoreError::read(format!(
                "read returned {}x{} samples for a {}x{} window",
                block.rows,
                block.cols,
                window.height(),
                window.width()
            )),
        ));
    }

    let range = SampleRange::of(&block.samples);
    Ok(TileData {
        coord,
        window,
        samples: block.samples,
        range,
        elapsed,
    })
}

/// Dispatches tile reads with an admission limit.
#[derive(Debug, Clone)]
pub struct TileFetcher {
    permits: Arc<Semaphore>,
    limit: usize,
}

impl TileFetcher {
    /// Create a fetcher allowing at most `limit` concurrent reads.
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            permits: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Spawn one task per planned tile. The permit pool is shared across
    /// generations; shutting down the returned set releases the permits of
    /// unfinished tasks.
    pub fn dispatch(
        &self,
        handle: ArrayHandle,
        slice: SliceSpec,
        plan: &TilePlan,
        token: GenerationToken,
    ) -> JoinSet<TileOutcome> {
        let mut tasks = JoinSet::new();

        for tile in &plan.tiles {
            let permits = self.permits.clone();
            let handle = handle.clone();
            let token = token.clone();
            let (coord, window) = (tile.coord, tile.window);

            tasks.spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return TileOutcome::Skipped(coord),
                };

                if token.is_canceled() {
                    return TileOutcome::Skipped(coord);
                }

                let result = fetch_tile(handle.as_ref(), slice, coord, window).await;

                if token.is_canceled() {
                    debug!(generation = token.id(), tile = %coord, "Discarding stale tile");
                    return TileOutcome::Skipped(coord);
                }

                match result {
                    Ok(data) => TileOutcome::Ready(data.normalize()),
                    Err(e) => {
                        warn!(generation = token.id(), error = %e, "Tile fetch failed");
                        TileOutcome::Failed(e)
                    }
                }
            });
        }

        tasks
    }
}

/// Global statistics of one slice, read in a single request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceStats {
    pub extent: PlaneExtent,
    /// `None` when the slice holds no finite sample.
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub fetch_ms: f64,
}

/// Read a whole slice plane and compute its global min/max.
pub async fn read_full_slice(
    handle: &dyn VolumeArray,
    slice: SliceSpec,
) -> Result<SliceStats, RenderError> {
    let extent = slice.plane_extent(&handle.shape())?;
    let selection = PlaneSelection::new(
        slice,
        0..extent.height as u64,
        0..extent.width as u64,
    );

    let start = Instant::now();
    let block = handle.read(&selection).await.map_err(RenderError::Read)?;
    let fetch_ms = start.elapsed().as_secs_f64() * 1000.0;

    let range = SampleRange::of(&block.samples);
    debug!(slice = %slice, fetch_ms = fetch_ms, "Read full slice");

    Ok(SliceStats {
        extent,
        min: range.map(|r| r.min),
        max: range.map(|r| r.max),
        fetch_ms,
    })
}
