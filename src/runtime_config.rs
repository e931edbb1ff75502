// =============================================================================
// Runtime Configuration — scanner settings with atomic save
// =============================================================================
//
// Every tunable parameter lives here: the tracked universe, the cache TTL,
// the history window and the strategy-leg geometry.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash. All fields carry serde defaults so that adding new fields never
// breaks loading an older config file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::universe::{default_universe, UniverseEntry};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_cache_ttl_secs() -> u64 {
    120
}

fn default_history_days() -> usize {
    90
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_data_source() -> String {
    "Yahoo Finance (NSE ~15min delayed)".to_string()
}

fn default_spread_offset_pct() -> f64 {
    3.0
}

fn default_condor_inner_pct() -> f64 {
    2.5
}

fn default_condor_outer_pct() -> f64 {
    4.0
}

fn default_target_pct() -> f64 {
    4.0
}

fn default_stop_pct() -> f64 {
    1.5
}

// =============================================================================
// StrategyParams
// =============================================================================

/// Leg geometry for the options strategy templates. All distances are
/// percentages of the current price, so the same settings scale across
/// symbols at different price levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyParams {
    /// Distance of the sold leg from the money in a vertical spread.
    #[serde(default = "default_spread_offset_pct")]
    pub spread_offset_pct: f64,

    /// Distance of the iron condor's sold strikes from the money.
    #[serde(default = "default_condor_inner_pct")]
    pub condor_inner_pct: f64,

    /// Distance of the iron condor's protective wings from the money.
    #[serde(default = "default_condor_outer_pct")]
    pub condor_outer_pct: f64,

    /// Target distance for a naked ATM buy.
    #[serde(default = "default_target_pct")]
    pub target_pct: f64,

    /// Stop-loss distance for a naked ATM buy.
    #[serde(default = "default_stop_pct")]
    pub stop_pct: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            spread_offset_pct: default_spread_offset_pct(),
            condor_inner_pct: default_condor_inner_pct(),
            condor_outer_pct: default_condor_outer_pct(),
            target_pct: default_target_pct(),
            stop_pct: default_stop_pct(),
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level configuration for the scanner.
///
/// Every field has a serde default so that older JSON files missing new
/// fields still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Tracked (symbol, sector) pairs, in response order.
    #[serde(default = "default_universe")]
    pub universe: Vec<UniverseEntry>,

    /// Seconds a published generation stays fresh.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Trading days of history requested per symbol. Must cover the longest
    /// indicator look-back (35 bars for a defined MACD signal line).
    #[serde(default = "default_history_days")]
    pub history_days: usize,

    /// Address the HTTP API binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Human-readable label of the market-data source, echoed in responses.
    #[serde(default = "default_data_source")]
    pub data_source: String,

    /// Options strategy leg geometry.
    #[serde(default)]
    pub strategy_params: StrategyParams,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            universe: default_universe(),
            cache_ttl_secs: default_cache_ttl_secs(),
            history_days: default_history_days(),
            bind_addr: default_bind_addr(),
            data_source: default_data_source(),
            strategy_params: StrategyParams::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = config.universe.len(),
            ttl_secs = config.cache_ttl_secs,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise runtime config")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.universe.len(), 50);
        assert_eq!(cfg.cache_ttl_secs, 120);
        assert_eq!(cfg.history_days, 90);
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000");
        assert!(cfg.data_source.contains("Yahoo Finance"));
        assert!((cfg.strategy_params.spread_offset_pct - 3.0).abs() < f64::EPSILON);
        assert!((cfg.strategy_params.condor_outer_pct - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.universe.len(), 50);
        assert_eq!(cfg.cache_ttl_secs, 120);
        assert!((cfg.strategy_params.stop_pct - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{
            "cache_ttl_secs": 60,
            "universe": [{ "symbol": "TCS", "sector": "IT" }]
        }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.cache_ttl_secs, 60);
        assert_eq!(cfg.universe.len(), 1);
        assert_eq!(cfg.universe[0].symbol, "TCS");
        assert_eq!(cfg.history_days, 90);
    }

    #[test]
    fn roundtrip_serialisation() {
        let cfg = RuntimeConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: RuntimeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.universe, cfg2.universe);
        assert_eq!(cfg.cache_ttl_secs, cfg2.cache_ttl_secs);
        assert_eq!(cfg.bind_addr, cfg2.bind_addr);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("swing-scanner-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("runtime_config.json");

        let mut cfg = RuntimeConfig::default();
        cfg.cache_ttl_secs = 45;
        cfg.save(&path).unwrap();

        let loaded = RuntimeConfig::load(&path).unwrap();
        assert_eq!(loaded.cache_ttl_secs, 45);
        assert_eq!(loaded.universe.len(), 50);

        std::fs::remove_dir_all(&dir).ok();
    }
}
