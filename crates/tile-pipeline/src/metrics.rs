//! Per-generation fetch metrics.
//!
//! A generation accumulates privately and publishes one immutable snapshot
//! once every task has settled. Observers only ever see whole snapshots of
//! completed generations.

use std::time::Duration;

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Fetch metrics of one completed generation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Generation the numbers belong to (0 before any completed).
    pub generation: u64,
    /// Tiles the plan asked for.
    pub tiles_planned: usize,
    /// Tiles fetched and composited.
    pub tiles_loaded: usize,
    /// Tiles whose read failed.
    pub tiles_failed: usize,
    /// Sum of per-tile read latency of loaded tiles.
    pub total_fetch_time_ms: f64,
    /// `total_fetch_time_ms / tiles_loaded`, 0 when nothing loaded.
    pub avg_fetch_time_ms: f64,
}

/// Accumulates one generation's tile results.
#[derive(Debug)]
pub struct MetricsAggregator {
    generation: u64,
    planned: usize,
    loaded: usize,
    failed: usize,
    total: Duration,
}

impl MetricsAggregator {
    pub fn new(generation: u64, planned: usize) -> Self {
        Self {
            generation,
            planned,
            loaded: 0,
            failed: 0,
            total: Duration::ZERO,
        }
    }

    /// Record a tile that was fetched and composited.
    pub fn record_success(&mut self, fetch_time: Duration) {
        self.loaded += 1;
        self.total += fetch_time;

        counter!("seismic_tiles_fetched_total").increment(1);
        histogram!("seismic_tile_fetch_ms").record(fetch_time.as_secs_f64() * 1000.0);
    }

    /// Record a tile whose read failed.
    pub fn record_failure(&mut self) {
        self.failed += 1;
        counter!("seismic_tile_fetch_errors_total").increment(1);
    }

    /// Close the generation and compute the snapshot.
    pub fn finish(self) -> MetricsSnapshot {
        let total_ms = self.total.as_secs_f64() * 1000.0;
        let avg_ms = if self.loaded == 0 {
            0.0
        } else {
            total_ms / self.loaded as f64
        };

        MetricsSnapshot {
            generation: self.generation,
            tiles_planned: self.planned,
            tiles_loaded: self.loaded,
            tiles_failed: self.failed,
            total_fetch_time_ms: total_ms,
            avg_fetch_time_ms: avg_ms,
        }
    }
}

/// Holds the latest completed snapshot.
#[derive(Debug)]
pub struct MetricsPublisher {
    tx: watch::Sender<MetricsSnapshot>,
}

impl Default for MetricsPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsPublisher {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(MetricsSnapshot::default());
        Self { tx }
    }

    /// Replace the snapshot unless a newer generation already published.
    pub fn publish(&self, snapshot: MetricsSnapshot) -> bool {
        self.tx.send_if_modified(|current| {
            if snapshot.generation > current.generation {
                *current = snapshot;
                true
            } else {
                false
            }
        })
    }

    pub fn latest(&self) -> MetricsSnapshot {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<MetricsSnapshot> {
        self.tx.subscribe()
    }
}
