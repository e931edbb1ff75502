// =============================================================================
// Swing Scanner — Main Entry Point
// =============================================================================
//
// NIFTY-50 swing signal backend: one scheduler task keeps the universe cache
// warm on a TTL, the HTTP API serves whatever generation is current.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod aggregate;
mod api;
mod app_state;
mod cache;
mod indicators;
mod market_data;
mod runtime_config;
mod signals;
mod snapshot;
mod strategy;
mod types;
mod universe;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::cache::RefreshOutcome;
use crate::market_data::{QuoteProvider, YahooClient};
use crate::runtime_config::RuntimeConfig;
use crate::universe::UniverseEntry;

/// Owns every cache write. Wakes on the TTL cadence and on on-demand triggers
/// from read handlers; both wakeup paths pass through one freshness gate, so
/// a trigger landing together with an overdue tick still produces a single
/// provider pass.
async fn run_refresh_scheduler<P: QuoteProvider>(
    state: Arc<AppState>,
    provider: P,
    mut refresh_rx: mpsc::Receiver<()>,
    tick_period: Duration,
) {
    let mut interval = tokio::time::interval(tick_period);

    loop {
        // First tick fires immediately, giving the startup prefetch.
        tokio::select! {
            _ = interval.tick() => {}
            triggered = refresh_rx.recv() => {
                if triggered.is_none() {
                    return; // all trigger senders dropped
                }
            }
        }

        // Skip while fresh, regardless of which path woke us.
        if state.cache.is_fresh() {
            continue;
        }

        // Clone the config out of the lock before awaiting.
        let config = state.config.read().clone();
        match state.cache.try_refresh(&provider, &config).await {
            RefreshOutcome::Published => {
                // Next timed pass counts a full period from this publish.
                interval.reset();
            }
            RefreshOutcome::Coalesced => {
                info!("refresh trigger coalesced into in-flight pass");
            }
            RefreshOutcome::Failed => {
                warn!(
                    error = ?state.cache.last_error(),
                    "refresh pass produced no data, keeping previous generation"
                );
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Swing Scanner — Starting Up                    ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let config_path =
        std::env::var("SCANNER_CONFIG").unwrap_or_else(|_| "runtime_config.json".into());
    let mut config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, path = %config_path, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    if let Ok(addr) = std::env::var("SCANNER_BIND_ADDR") {
        config.bind_addr = addr;
    }

    // Restrict the universe from env if requested (keeps sectors intact).
    if let Ok(syms) = std::env::var("SCANNER_SYMBOLS") {
        let wanted: Vec<String> = syms
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !wanted.is_empty() {
            config.universe = wanted
                .iter()
                .map(|sym| {
                    config
                        .universe
                        .iter()
                        .find(|e| e.symbol.eq_ignore_ascii_case(sym))
                        .cloned()
                        .unwrap_or_else(|| UniverseEntry::new(sym, "Unknown"))
                })
                .collect();
        }
    }

    info!(
        symbols = config.universe.len(),
        ttl_secs = config.cache_ttl_secs,
        history_days = config.history_days,
        "Universe configured"
    );

    // ── 2. Shared state & refresh trigger channel ────────────────────────
    // Capacity 1: triggers arriving while a pass runs coalesce into one.
    let (refresh_tx, refresh_rx) = mpsc::channel::<()>(1);
    let state = Arc::new(AppState::new(config, refresh_tx));

    // ── 3. Scheduler task — the only writer to the cache ─────────────────
    let tick_period = Duration::from_secs(state.config.read().cache_ttl_secs.max(1));
    tokio::spawn(run_refresh_scheduler(
        state.clone(),
        YahooClient::new(),
        refresh_rx,
        tick_period,
    ));

    // ── 4. HTTP API server ───────────────────────────────────────────────
    let bind_addr = state.config.read().bind_addr.clone();
    let app = api::rest::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "API server listening");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "API server failed");
        }
    });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping gracefully");

    if let Err(e) = state.config.read().save(&config_path) {
        error!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("Swing Scanner shut down complete.");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::PriceHistory;
    use crate::types::{IndexSnapshot, ProviderError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Always-succeeding provider that counts history fetches.
    struct CountingProvider {
        calls: Arc<AtomicUsize>,
    }

    impl QuoteProvider for CountingProvider {
        async fn daily_history(
            &self,
            _symbol: &str,
            _days: usize,
        ) -> Result<PriceHistory, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
            Ok(PriceHistory {
                highs: closes.iter().map(|c| c + 1.0).collect(),
                lows: closes.iter().map(|c| c - 1.0).collect(),
                closes,
            })
        }

        async fn index_quote(&self) -> Result<IndexSnapshot, ProviderError> {
            Ok(IndexSnapshot {
                price: 22450.0,
                change: 50.0,
                change_pct: 0.22,
            })
        }
    }

    fn two_symbol_config(ttl_secs: u64) -> RuntimeConfig {
        let mut cfg = RuntimeConfig::default();
        cfg.universe = vec![
            UniverseEntry::new("AAA", "Test"),
            UniverseEntry::new("BBB", "Test"),
        ];
        cfg.cache_ttl_secs = ttl_secs;
        cfg
    }

    #[tokio::test]
    async fn overdue_ticks_after_a_publish_do_not_refetch() {
        // Tick far more often than the freshness window: only the startup
        // prefetch may reach the provider.
        let (tx, rx) = mpsc::channel::<()>(1);
        let state = Arc::new(AppState::new(two_symbol_config(300), tx));
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CountingProvider {
            calls: calls.clone(),
        };

        let scheduler = tokio::spawn(run_refresh_scheduler(
            state.clone(),
            provider,
            rx,
            Duration::from_millis(10),
        ));

        tokio::time::sleep(Duration::from_millis(150)).await;
        scheduler.abort();

        assert!(state.cache.current().is_some());
        // Two symbols, exactly one pass.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn trigger_racing_the_timer_runs_a_single_pass() {
        // A read-side trigger queued at the same moment the first tick is
        // due: whichever wakeup loses the race finds a fresh cache and skips.
        let (tx, rx) = mpsc::channel::<()>(1);
        let state = Arc::new(AppState::new(two_symbol_config(300), tx));
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CountingProvider {
            calls: calls.clone(),
        };

        state.request_refresh(); // pending before the scheduler starts

        let scheduler = tokio::spawn(run_refresh_scheduler(
            state.clone(),
            provider,
            rx,
            Duration::from_millis(10),
        ));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(
            calls.load(Ordering::SeqCst),
            2,
            "tick + trigger must not double the provider pass"
        );

        // A later trigger against the still-fresh cache is also skipped.
        state.request_refresh();
        tokio::time::sleep(Duration::from_millis(50)).await;
        scheduler.abort();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn stale_cache_keeps_refreshing_on_the_timer() {
        // TTL 0 means a generation is stale the instant it publishes, so
        // every tick must run a pass: the freshness gate never wedges shut.
        let (tx, rx) = mpsc::channel::<()>(1);
        let state = Arc::new(AppState::new(two_symbol_config(0), tx));
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CountingProvider {
            calls: calls.clone(),
        };

        let scheduler = tokio::spawn(run_refresh_scheduler(
            state.clone(),
            provider,
            rx,
            Duration::from_millis(10),
        ));

        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.abort();

        assert!(calls.load(Ordering::SeqCst) >= 4, "expected repeated passes");
    }
}
