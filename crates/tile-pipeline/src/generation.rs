//! Render generations.
//!
//! Every effective change of selection or transform starts a new
//! generation. Starting one cancels its predecessor; tasks of a canceled
//! generation skip normalization and compositing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct CancelState {
    canceled: AtomicBool,
    notify: Notify,
}

/// Handle passed to every task of one generation.
#[derive(Debug, Clone)]
pub struct GenerationToken {
    id: u64,
    state: Arc<CancelState>,
}

impl GenerationToken {
    fn new(id: u64) -> Self {
        Self {
            id,
            state: Arc::new(CancelState::default()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// True once a newer generation has started.
    pub fn is_canceled(&self) -> bool {
        self.state.canceled.load(Ordering::Acquire)
    }

    /// Resolves once the generation is superseded.
    pub async fn canceled(&self) {
        let notified = self.state.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_canceled() {
            return;
        }
        notified.await;
    }

    /// True while this is still the active generation.
    pub fn is_current(&self) -> bool {
        !self.is_canceled()
    }

    fn cancel(&self) {
        self.state.canceled.store(true, Ordering::Release);
        self.state.notify.notify_waiters();
    }
}

/// Issues monotonically increasing generations.
#[derive(Debug, Default)]
pub struct GenerationTracker {
    last_id: u64,
    active: Option<GenerationToken>,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, superseding the active one.
    pub fn begin(&mut self) -> GenerationToken {
        if let Some(previous) = self.active.take() {
            previous.cancel();
            metrics::counter!("seismic_generations_superseded_total").increment(1);
            tracing::debug!(generation = previous.id, "Generation superseded");
        }

        self.last_id += 1;
        let token = GenerationToken::new(self.last_id);
        self.active = Some(token.clone());
        token
    }

    /// Retire `token` once its last task has settled. A no-op when a newer
    /// generation is already active.
    pub fn retire(&mut self, token: &GenerationToken) -> bool {
        match &self.active {
            Some(active) if active.id == token.id => {
                self.active = None;
                true
            }
            _ => false,
        }
    }

    /// Id of the active generation, if any.
    pub fn active_id(&self) -> Option<u64> {
        self.active.as_ref().map(|t| t.id)
    }

    /// Id of the most recently started generation (0 before the first).
    pub fn last_id(&self) -> u64 {
        self.last_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut tracker = GenerationTracker::new();
        let a = tracker.begin();
        let b = tracker.begin();
        let c = tracker.begin();
        assert!(a.id() < b.id() && b.id() < c.id());
        assert_eq!(tracker.last_id(), c.id());
    }

    #[test]
    fn test_begin_cancels_previous() {
        let mut tracker = GenerationTracker::new();
        let first = tracker.begin();
        assert!(first.is_current());

        let second = tracker.begin();
        assert!(first.is_canceled());
        assert!(second.is_current());
        assert_eq!(tracker.active_id(), Some(second.id()));
    }

    #[test]
    fn test_retire_only_active() {
        let mut tracker = GenerationTracker::new();
        let first = tracker.begin();
        let second = tracker.begin();

        assert!(!tracker.retire(&first));
        assert_eq!(tracker.active_id(), Some(second.id()));

        assert!(tracker.retire(&second));
        assert_eq!(tracker.active_id(), None);
        // Retiring does not cancel
        assert!(second.is_current());
    }

    #[test]
    fn test_clones_share_cancellation() {
        let mut tracker = GenerationTracker::new();
        let token = tracker.begin();
        let task_copy = token.clone();
        tracker.begin();
        assert!(task_copy.is_canceled());
    }

    #[tokio::test]
    async fn test_canceled_wakes_waiter() {
        let mut tracker = GenerationTracker::new();
        let token = tracker.begin();

        let waiter = tokio::spawn({
            let token = token.clone();
            async move { token.canceled().await }
        });
        tokio::task::yield_now().await;

        tracker.begin();
        tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
            .await
            .expect("waiter not woken")
            .unwrap();
    }

    #[tokio::test]
    async fn test_canceled_returns_immediately_when_already_canceled() {
        let mut tracker = GenerationTracker::new();
        let token = tracker.begin();
        tracker.begin();
        token.canceled().await;
    }
}
