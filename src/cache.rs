// =============================================================================
// Universe Cache — generations, TTL, single-flight refresh
// =============================================================================
//
// The single shared mutable resource in the process. A refresh pass fetches
// the whole universe, builds one snapshot per symbol (concurrently) and
// publishes the result as an immutable `Generation` behind an atomic swap:
// readers see either the old generation or the new one in full, never a mix.
//
// Lifecycle per generation: Empty (process start) -> Fresh (age < TTL) ->
// Stale (age >= TTL). At most one refresh is in flight at a time; concurrent
// triggers coalesce into it rather than queueing additional provider passes.
// A failed refresh retains the last good generation, so reads never regress
// to Empty once any refresh has succeeded.
//
// Per-symbol failure containment:
//   transient -> previous snapshot carried over, flagged stale
//   fatal     -> symbol dropped from future passes, logged once
//   all fail  -> generation not published, error surfaced via /api/health
// =============================================================================

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::market_data::QuoteProvider;
use crate::runtime_config::RuntimeConfig;
use crate::snapshot::{build_snapshot, Snapshot};
use crate::types::{IndexSnapshot, ProviderError};

/// One published refresh result for the whole universe.
///
/// Immutable once published. All snapshots built in this pass share
/// `built_at`; carried-over stale snapshots keep their original timestamp.
#[derive(Debug)]
pub struct Generation {
    /// Snapshots in universe order.
    pub snapshots: Vec<Snapshot>,
    /// Index reference instrument, carried over when its fetch fails.
    pub index: Option<IndexSnapshot>,
    pub built_at: DateTime<Utc>,
}

impl Generation {
    /// Look up one symbol, case-insensitively.
    pub fn get(&self, symbol: &str) -> Option<&Snapshot> {
        self.snapshots
            .iter()
            .find(|s| s.sym.eq_ignore_ascii_case(symbol))
    }
}

/// What a refresh trigger accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new generation was built and swapped in.
    Published,
    /// Another refresh was already in flight; this trigger folded into it.
    Coalesced,
    /// No symbol produced data; the previous generation was retained.
    Failed,
}

/// TTL cache over the latest generation.
pub struct SignalCache {
    current: RwLock<Option<Arc<Generation>>>,
    refreshing: AtomicBool,
    last_error: RwLock<Option<String>>,
    /// Symbols that failed fatally (unknown/delisted); excluded from passes.
    dead_symbols: RwLock<HashSet<String>>,
    ttl_secs: u64,
}

impl SignalCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            current: RwLock::new(None),
            refreshing: AtomicBool::new(false),
            last_error: RwLock::new(None),
            dead_symbols: RwLock::new(HashSet::new()),
            ttl_secs,
        }
    }

    /// Current generation, if any refresh has ever succeeded. Never blocks on
    /// an in-flight refresh.
    pub fn current(&self) -> Option<Arc<Generation>> {
        self.current.read().clone()
    }

    /// Seconds since the current generation was built.
    pub fn age_secs(&self) -> Option<i64> {
        self.current()
            .map(|g| (Utc::now() - g.built_at).num_seconds().max(0))
    }

    /// Fresh = a generation exists and is younger than the TTL.
    pub fn is_fresh(&self) -> bool {
        self.age_secs()
            .map(|age| (age as u64) < self.ttl_secs)
            .unwrap_or(false)
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    /// Seconds until the current generation goes stale (0 when already stale
    /// or empty).
    pub fn next_refresh_secs(&self) -> u64 {
        match self.age_secs() {
            Some(age) => self.ttl_secs.saturating_sub(age as u64),
            None => 0,
        }
    }

    /// Run one refresh pass unless one is already in flight.
    ///
    /// This is the only mutation path. Concurrent callers coalesce: exactly
    /// one performs the provider pass, the rest return immediately and keep
    /// reading the last good generation.
    pub async fn try_refresh<P: QuoteProvider>(
        &self,
        provider: &P,
        config: &RuntimeConfig,
    ) -> RefreshOutcome {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return RefreshOutcome::Coalesced;
        }

        let outcome = self.refresh_pass(provider, config).await;
        self.refreshing.store(false, Ordering::SeqCst);
        outcome
    }

    async fn refresh_pass<P: QuoteProvider>(
        &self,
        provider: &P,
        config: &RuntimeConfig,
    ) -> RefreshOutcome {
        let started = std::time::Instant::now();
        let built_at = Utc::now();
        let prev = self.current();

        let dead = self.dead_symbols.read().clone();
        let live: Vec<_> = config
            .universe
            .iter()
            .filter(|e| !dead.contains(&e.symbol))
            .collect();

        // Fetch the whole universe concurrently; symbol order is restored by
        // join_all, so snapshots come out in universe order.
        let results = join_all(live.iter().map(|entry| async move {
            let result = provider.daily_history(&entry.symbol, config.history_days).await;
            (*entry, result)
        }))
        .await;

        let index = match provider.index_quote().await {
            Ok(q) => Some(q),
            Err(e) => {
                warn!(error = %e, "index quote failed — carrying previous value");
                prev.as_ref().and_then(|g| g.index.clone())
            }
        };

        let mut snapshots = Vec::with_capacity(results.len());
        let mut fresh = 0usize;
        let mut carried = 0usize;

        for (entry, result) in results {
            match result {
                Ok(history) => {
                    match build_snapshot(entry, &history, built_at, &config.strategy_params) {
                        Ok(snap) => {
                            fresh += 1;
                            snapshots.push(snap);
                        }
                        Err(e) => warn!(symbol = %entry.symbol, error = %e, "symbol skipped"),
                    }
                }
                Err(ProviderError::Transient(msg)) => {
                    warn!(symbol = %entry.symbol, error = %msg, "transient fetch failure");
                    if let Some(old) = prev.as_ref().and_then(|g| g.get(&entry.symbol)) {
                        let mut snap = old.clone();
                        snap.stale = true;
                        carried += 1;
                        snapshots.push(snap);
                    }
                }
                Err(ProviderError::Fatal(msg)) => {
                    warn!(symbol = %entry.symbol, error = %msg, "symbol dropped from universe");
                    self.dead_symbols.write().insert(entry.symbol.clone());
                }
            }
        }

        if fresh == 0 {
            // Provider effectively unreachable: keep the previous generation
            // and surface the failure instead of publishing carried data
            // under a new timestamp.
            let msg = format!(
                "refresh failed: no fresh data for any of {} symbols",
                live.len()
            );
            warn!("{msg}");
            *self.last_error.write() = Some(msg);
            return RefreshOutcome::Failed;
        }

        let generation = Arc::new(Generation {
            snapshots,
            index,
            built_at,
        });

        // Atomic publication: readers see the old generation or this one,
        // never a half-built set.
        *self.current.write() = Some(generation);
        *self.last_error.write() = None;

        info!(
            fresh,
            carried,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generation published"
        );
        RefreshOutcome::Published
    }
}
