//! The slice viewer: ties selection, viewport, fetching and compositing
//! together into render generations.

use std::sync::{Arc, Mutex, MutexGuard};

use renderer::{composite, RenderSurface};
use seismic_common::{dataset_address, PlaneExtent, SliceSpec, SliceType};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use volume_store::{ArrayHandle, VolumeStore};

use crate::config::PipelineConfig;
use crate::error::RenderError;
use crate::fetcher::{TileFetcher, TileOutcome};
use crate::generation::{GenerationToken, GenerationTracker};
use crate::input::{InputEvent, PanZoomController};
use crate::metrics::{MetricsAggregator, MetricsPublisher, MetricsSnapshot};
use crate::planner::{PlanPolicy, TilePlan, TilePlanner};
use crate::viewport::ViewportTransform;

/// How a generation ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderOutcome {
    /// Every task settled; the snapshot was published.
    Completed(MetricsSnapshot),
    /// A newer generation started first. Nothing was published.
    Superseded { generation: u64 },
}

impl RenderOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Selection {
    dataset_id: String,
    level: u32,
    slice: SliceSpec,
}

struct OpenedArray {
    dataset_id: String,
    level: u32,
    handle: ArrayHandle,
}

struct ViewerState {
    viewport: ViewportTransform,
    controller: PanZoomController,
    viewport_width: usize,
    viewport_height: usize,
    selection: Option<Selection>,
    opened: Option<OpenedArray>,
    generations: GenerationTracker,
}

/// Renders one slice of a remote volume into a host surface.
///
/// Every `render` call and every effective pan/zoom (under
/// [`PlanPolicy::ViewportCulled`]) starts a new generation and cancels the
/// previous one. A viewer is `Sync`; share it behind an `Arc` to drive input
/// while a render is in flight.
pub struct SliceViewer<S: RenderSurface + 'static> {
    store: Arc<dyn VolumeStore>,
    config: PipelineConfig,
    planner: TilePlanner,
    fetcher: TileFetcher,
    surface: Arc<tokio::sync::Mutex<S>>,
    state: Mutex<ViewerState>,
    metrics: MetricsPublisher,
}

impl<S: RenderSurface + 'static> SliceViewer<S> {
    pub fn new(
        store: Arc<dyn VolumeStore>,
        surface: S,
        config: PipelineConfig,
    ) -> Result<Self, RenderError> {
        config.validate().map_err(RenderError::config)?;

        let state = ViewerState {
            viewport: ViewportTransform::default(),
            controller: PanZoomController::new(),
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            selection: None,
            opened: None,
            generations: GenerationTracker::new(),
        };

        Ok(Self {
            store,
            planner: TilePlanner::new(config.tile_size),
            fetcher: TileFetcher::new(config.max_concurrent_fetches),
            config,
            surface: Arc::new(tokio::sync::Mutex::new(surface)),
            state: Mutex::new(state),
            metrics: MetricsPublisher::new(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Shared handle to the host surface.
    pub fn surface(&self) -> Arc<tokio::sync::Mutex<S>> {
        self.surface.clone()
    }

    /// Snapshot of the most recently completed generation.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.latest()
    }

    pub fn subscribe_metrics(&self) -> watch::Receiver<MetricsSnapshot> {
        self.metrics.subscribe()
    }

    pub fn viewport(&self) -> ViewportTransform {
        self.state().viewport
    }

    /// Resize the viewport. Takes effect at the next generation.
    pub fn set_viewport_size(&self, width: usize, height: usize) {
        let mut state = self.state();
        state.viewport_width = width;
        state.viewport_height = height;
    }

    /// Select a slice and render it.
    pub async fn render(
        &self,
        dataset_id: &str,
        level: u32,
        slice_type: SliceType,
        slice_number: u64,
    ) -> Result<RenderOutcome, RenderError> {
        let selection = Selection {
            dataset_id: dataset_id.to_string(),
            level,
            slice: SliceSpec::new(slice_type, slice_number),
        };

        let token = {
            let mut state = self.state();
            state.selection = Some(selection.clone());
            state.generations.begin()
        };

        self.run_generation(selection, token).await
    }

    /// Apply one input event.
    ///
    /// Returns the outcome of the re-render when the event started a new
    /// generation, `None` when it only moved the presentation transform or
    /// changed nothing.
    pub async fn on_pan_zoom(
        &self,
        event: InputEvent,
    ) -> Result<Option<RenderOutcome>, RenderError> {
        let (transform, rerender) = {
            let mut guard = self.state();
            let state = &mut *guard;
            if !state.controller.handle(event, &mut state.viewport) {
                return Ok(None);
            }

            let rerender = match (&state.selection, self.config.plan_policy) {
                (Some(selection), PlanPolicy::ViewportCulled) => {
                    Some((selection.clone(), state.generations.begin()))
                }
                _ => None,
            };
            (state.viewport, rerender)
        };

        match rerender {
            Some((selection, token)) => self.run_generation(selection, token).await.map(Some),
            None => {
                self.surface
                    .lock()
                    .await
                    .set_transform(transform.surface_transform());
                Ok(None)
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn run_generation(
        &self,
        selection: Selection,
        token: GenerationToken,
    ) -> Result<RenderOutcome, RenderError> {
        let generation = token.id();

        let prepared = match self.prepare(&selection, &token).await {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(generation = generation, error = %e, "Render failed");
                let mut surface = self.surface.lock().await;
                if !token.is_canceled() {
                    surface.show_error(&e.to_string());
                }
                drop(surface);
                self.state().generations.retire(&token);
                return Err(e);
            }
        };

        let Some((handle, plan)) = prepared else {
            debug!(generation = generation, "Generation superseded before dispatch");
            return Ok(RenderOutcome::Superseded { generation });
        };

        info!(
            generation = generation,
            dataset = %selection.dataset_id,
            level = selection.level,
            slice = %selection.slice,
            tiles = plan.len(),
            "Starting render generation"
        );

        let mut aggregator = MetricsAggregator::new(generation, plan.len());
        let mut tasks = self
            .fetcher
            .dispatch(handle, selection.slice, &plan, token.clone());

        loop {
            let joined = tokio::select! {
                biased;
                _ = token.canceled() => {
                    tasks.shutdown().await;
                    debug!(generation = generation, "Generation superseded");
                    return Ok(RenderOutcome::Superseded { generation });
                }
                joined = tasks.join_next() => joined,
            };

            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok(TileOutcome::Ready(tile)) => {
                    let mut surface = self.surface.lock().await;
                    if token.is_canceled() {
                        continue;
                    }
                    let written = composite(
                        &mut *surface,
                        &tile.window,
                        &tile.intensities,
                        self.config.rotate,
                    );
                    match written {
                        Ok(()) => aggregator.record_success(tile.fetch_time),
                        Err(e) => {
                            warn!(
                                generation = generation,
                                tile = %tile.coord,
                                error = %e,
                                "Composite failed"
                            );
                            aggregator.record_failure();
                        }
                    }
                }
                Ok(TileOutcome::Failed(_)) => aggregator.record_failure(),
                Ok(TileOutcome::Skipped(_)) => {}
                Err(e) => {
                    warn!(generation = generation, error = %e, "Tile task panicked");
                    aggregator.record_failure();
                }
            }
        }

        if token.is_canceled() {
            debug!(generation = generation, "Generation superseded");
            return Ok(RenderOutcome::Superseded { generation });
        }

        let snapshot = aggregator.finish();
        self.metrics.publish(snapshot);
        self.state().generations.retire(&token);

        info!(
            generation = generation,
            tiles_planned = snapshot.tiles_planned,
            tiles_loaded = snapshot.tiles_loaded,
            tiles_failed = snapshot.tiles_failed,
            avg_fetch_ms = snapshot.avg_fetch_time_ms,
            "Render generation complete"
        );

        Ok(RenderOutcome::Completed(snapshot))
    }

    /// Open the array, validate the slice, reset the surface and plan.
    /// `None` when the generation was superseded on the way.
    async fn prepare(
        &self,
        selection: &Selection,
        token: &GenerationToken,
    ) -> Result<Option<(ArrayHandle, TilePlan)>, RenderError> {
        let handle = self.open(selection, token).await?;
        let extent = selection.slice.plane_extent(&handle.shape())?;

        let mut surface = self.surface.lock().await;
        if token.is_canceled() {
            return Ok(None);
        }

        // Read under the surface lock so a concurrent pan cannot land between
        // the read and `set_transform`.
        let (viewport, width, height) = {
            let state = self.state();
            (state.viewport, state.viewport_width, state.viewport_height)
        };

        let display = self.display_extent(&extent);
        surface.allocate(display.width, display.height);
        surface.set_transform(viewport.surface_transform());
        drop(surface);

        let mut visible = viewport.visible_array_region(width, height, &display);
        if self.config.rotate {
            visible = visible.transposed();
        }

        let plan = self.planner.plan(self.config.plan_policy, &extent, &visible);
        Ok(Some((handle, plan)))
    }

    /// Reuse the handle of the current dataset and level, or open a new one.
    async fn open(
        &self,
        selection: &Selection,
        token: &GenerationToken,
    ) -> Result<ArrayHandle, RenderError> {
        {
            let state = self.state();
            if let Some(opened) = &state.opened {
                if opened.dataset_id == selection.dataset_id && opened.level == selection.level {
                    return Ok(opened.handle.clone());
                }
            }
        }

        let address = dataset_address(
            &self.config.api_root,
            &selection.dataset_id,
            selection.level,
        );
        let handle = self.store.open(&address).await.map_err(RenderError::open)?;

        if token.is_current() {
            self.state().opened = Some(OpenedArray {
                dataset_id: selection.dataset_id.clone(),
                level: selection.level,
                handle: handle.clone(),
            });
        }

        Ok(handle)
    }

    fn display_extent(&self, extent: &PlaneExtent) -> PlaneExtent {
        if self.config.rotate {
            extent.transposed()
        } else {
            *extent
        }
    }
}
