//! In-memory volume store for pipeline tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use seismic_common::{SliceSpec, VolumeShape};
use tokio::sync::Semaphore;
use volume_store::{
    ArrayHandle, PlaneSelection, SampleBlock, StoreError, VolumeArray, VolumeStore,
};

pub const API_ROOT: &str = "mem://zarr";

type SampleFn = dyn Fn(SliceSpec, u64, u64) -> f32 + Send + Sync;

/// Volume computing each sample from `(slice, trace, sample)`.
pub struct MockVolume {
    shape: VolumeShape,
    value: Box<SampleFn>,
    /// Reads starting at `(sample, trace)` fail.
    failing: HashSet<(u64, u64)>,
    delay: Duration,
    gate: Option<Arc<Semaphore>>,
    pub reads: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl MockVolume {
    pub fn new(
        shape: VolumeShape,
        value: impl Fn(SliceSpec, u64, u64) -> f32 + Send + Sync + 'static,
    ) -> Self {
        Self {
            shape,
            value: Box::new(value),
            failing: HashSet::new(),
            delay: Duration::ZERO,
            gate: None,
            reads: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Sample value rises along the sample axis and with the trace index.
    pub fn ramp(shape: VolumeShape) -> Self {
        Self::new(shape, |_, trace, sample| (trace * 1000 + sample) as f32)
    }

    /// Fail the tile whose window starts at `(x0, y0)`.
    pub fn failing_at(mut self, x0: u64, y0: u64) -> Self {
        self.failing.insert((x0, y0));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Block every read until the gate has permits.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl VolumeArray for MockVolume {
    fn shape(&self) -> VolumeShape {
        self.shape
    }

    async fn read(&self, selection: &PlaneSelection) -> volume_store::Result<SampleBlock> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|e| StoreError::read(e.to_string()))?;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        selection.check_bounds(&self.shape)?;
        if self
            .failing
            .contains(&(selection.samples.start, selection.traces.start))
        {
            return Err(StoreError::read("injected read failure"));
        }

        let mut samples = Vec::with_capacity(selection.rows() * selection.cols());
        for trace in selection.traces.clone() {
            for sample in selection.samples.clone() {
                samples.push((self.value)(selection.slice, trace, sample));
            }
        }
        SampleBlock::new(selection.rows(), selection.cols(), samples)
    }
}

/// Store mapping addresses to mock volumes.
#[derive(Default)]
pub struct MockStore {
    volumes: HashMap<String, Arc<MockVolume>>,
    pub opens: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a volume at `{API_ROOT}/{dataset}/level_{level}/seismic`.
    pub fn with_volume(mut self, dataset: &str, level: u32, volume: MockVolume) -> Self {
        let address = seismic_common::dataset_address(API_ROOT, dataset, level);
        self.volumes.insert(address, Arc::new(volume));
        self
    }

    pub fn volume(&self, dataset: &str, level: u32) -> Arc<MockVolume> {
        let address = seismic_common::dataset_address(API_ROOT, dataset, level);
        self.volumes[&address].clone()
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VolumeStore for MockStore {
    async fn open(&self, address: &str) -> volume_store::Result<ArrayHandle> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        match self.volumes.get(address) {
            Some(volume) => Ok(volume.clone() as ArrayHandle),
            None => Err(StoreError::open(address, "no such dataset")),
        }
    }
}

/// Poll until `condition` holds, failing the test after one second.
pub async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
