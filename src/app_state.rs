// =============================================================================
// Shared Application State
// =============================================================================
//
// Everything the API handlers can reach. Handlers never mutate the cache
// directly: the only write path is the scheduler task, and on-demand refresh
// requests travel to it through a capacity-1 channel, so triggers arriving
// while a pass is in flight coalesce instead of queueing.
// =============================================================================

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::cache::SignalCache;
use crate::runtime_config::RuntimeConfig;

/// Central state shared across the API and the scheduler via `Arc<AppState>`.
pub struct AppState {
    pub cache: Arc<SignalCache>,
    pub config: Arc<RwLock<RuntimeConfig>>,
    /// Trigger channel into the scheduler task.
    refresh_tx: mpsc::Sender<()>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: RuntimeConfig, refresh_tx: mpsc::Sender<()>) -> Self {
        let cache = Arc::new(SignalCache::new(config.cache_ttl_secs));
        Self {
            cache,
            config: Arc::new(RwLock::new(config)),
            refresh_tx,
            start_time: std::time::Instant::now(),
        }
    }

    /// Ask the scheduler for a refresh. Non-blocking: if a trigger is already
    /// pending or a pass is running, this folds into it.
    pub fn request_refresh(&self) {
        let _ = self.refresh_tx.try_send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_refresh_requests_coalesce_in_the_channel() {
        let (tx, mut rx) = mpsc::channel::<()>(1);
        let state = AppState::new(RuntimeConfig::default(), tx);

        // Many requests while nothing drains the channel: only one survives.
        for _ in 0..10 {
            state.request_refresh();
        }
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn cache_ttl_comes_from_config() {
        let (tx, _rx) = mpsc::channel::<()>(1);
        let mut cfg = RuntimeConfig::default();
        cfg.cache_ttl_secs = 7;
        let state = AppState::new(cfg, tx);
        assert!(!state.cache.is_fresh());
        assert_eq!(state.cache.next_refresh_secs(), 0);
    }
}
