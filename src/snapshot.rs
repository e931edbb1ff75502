// =============================================================================
// Snapshot Builder — one immutable per-symbol record per refresh
// =============================================================================
//
// Combines the fetched price series, the computed indicator set, the
// composite signal and the selected options strategy into the record the
// dashboard consumes. A refresh always produces a brand new snapshot; nothing
// is patched in place.
//
// Only an unusable price series (fewer than two closes) fails the symbol.
// Missing indicators serialise as `null` and the signal degrades toward
// NEUTRAL instead of aborting.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::indicators::{Bollinger, IndicatorSet, Macd};
use crate::market_data::PriceHistory;
use crate::runtime_config::StrategyParams;
use crate::signals;
use crate::strategy::{self, OptionDetails};
use crate::types::Direction;
use crate::universe::UniverseEntry;

/// Closes carried in each snapshot for sparkline rendering.
const HISTORY_TAIL: usize = 60;

/// The price series was too short to price the symbol at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsufficientHistory {
    pub symbol: String,
    pub bars: usize,
}

impl std::fmt::Display for InsufficientHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "insufficient history for {}: {} bars",
            self.symbol, self.bars
        )
    }
}

impl std::error::Error for InsufficientHistory {}

/// Everything the dashboard shows for one symbol, frozen at `last_updated`.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub sym: String,
    pub sector: String,
    pub price: f64,
    /// 1-day close-to-close change, percent.
    pub change: f64,
    /// 5-day close-to-close change, percent.
    #[serde(rename = "change5d")]
    pub change_5d: f64,
    #[serde(rename = "priceHistory")]
    pub price_history: Vec<f64>,

    // Indicator fields; `null` when the series was too short for the window.
    pub rsi: Option<f64>,
    /// `null` until the signal line is defined (34 closes); the window where
    /// only the MACD line exists is not surfaced.
    pub macd: Option<Macd>,
    pub sma20: Option<f64>,
    pub ema9: Option<f64>,
    pub ema21: Option<f64>,
    pub atr: Option<f64>,
    pub bb: Option<Bollinger>,
    #[serde(rename = "bbPos")]
    pub bb_pos: Option<f64>,

    pub score: f64,
    pub direction: Direction,
    pub confidence: u32,
    pub reasons: Vec<String>,

    #[serde(rename = "optionStrategy")]
    pub option_strategy: &'static str,
    #[serde(rename = "optionDetails")]
    pub option_details: OptionDetails,

    /// True when this snapshot was carried over from a previous generation
    /// because the provider failed transiently for the symbol.
    pub stale: bool,
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}

/// Build the snapshot for one symbol from its fetched history.
///
/// `as_of` is the refresh's shared timestamp: every snapshot in a generation
/// carries the same value.
pub fn build_snapshot(
    entry: &UniverseEntry,
    history: &PriceHistory,
    as_of: DateTime<Utc>,
    params: &StrategyParams,
) -> Result<Snapshot, InsufficientHistory> {
    let closes = &history.closes;
    if closes.len() < 2 {
        return Err(InsufficientHistory {
            symbol: entry.symbol.clone(),
            bars: closes.len(),
        });
    }

    let n = closes.len();
    let price = closes[n - 1];
    let change = pct_change(closes[n - 2], price);
    let change_5d = if n > 5 {
        pct_change(closes[n - 6], price)
    } else {
        0.0
    };

    let ind = IndicatorSet::compute(history);
    let signal = signals::evaluate(&ind, price);
    let pick = strategy::select(
        signal.direction,
        signal.confidence,
        &entry.symbol,
        price,
        ind.atr,
        params,
    );

    let tail_start = n.saturating_sub(HISTORY_TAIL);

    Ok(Snapshot {
        sym: entry.symbol.clone(),
        sector: entry.sector.clone(),
        price,
        change,
        change_5d,
        price_history: closes[tail_start..].to_vec(),
        rsi: ind.rsi,
        macd: ind.macd,
        sma20: ind.sma20,
        ema9: ind.ema9,
        ema21: ind.ema21,
        atr: ind.atr,
        bb: ind.bollinger,
        bb_pos: ind.bb_pos,
        score: signal.score,
        direction: signal.direction,
        confidence: signal.confidence,
        reasons: signal.reasons,
        option_strategy: pick.name,
        option_details: pick.details,
        stale: false,
        last_updated: as_of,
    })
}

fn pct_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        0.0
    } else {
        (to - from) / from * 100.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> UniverseEntry {
        UniverseEntry::new("TCS", "IT")
    }

    fn uptrend(n: usize) -> PriceHistory {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        PriceHistory {
            highs: closes.iter().map(|c| c + 1.0).collect(),
            lows: closes.iter().map(|c| c - 1.0).collect(),
            closes,
        }
    }

    #[test]
    fn empty_series_is_insufficient() {
        let err = build_snapshot(
            &entry(),
            &PriceHistory::default(),
            Utc::now(),
            &StrategyParams::default(),
        )
        .unwrap_err();
        assert_eq!(err.symbol, "TCS");
        assert_eq!(err.bars, 0);
    }

    #[test]
    fn single_close_is_insufficient() {
        let history = PriceHistory {
            closes: vec![100.0],
            highs: vec![101.0],
            lows: vec![99.0],
        };
        assert!(build_snapshot(&entry(), &history, Utc::now(), &StrategyParams::default()).is_err());
    }

    #[test]
    fn short_series_degrades_to_neutral_low_confidence() {
        // Five closes: every indicator window is unmet, so the signal must
        // fall back to NEUTRAL with no firing reasons.
        let history = uptrend(5);
        let snap =
            build_snapshot(&entry(), &history, Utc::now(), &StrategyParams::default()).unwrap();
        assert_eq!(snap.direction, Direction::Neutral);
        assert_eq!(snap.confidence, 0);
        assert!(snap.reasons.is_empty());
        assert!(snap.rsi.is_none());
        assert!(snap.macd.is_none());
        assert_eq!(snap.option_strategy, "Iron Condor");
        assert!(!snap.stale);
    }

    #[test]
    fn changes_are_close_to_close_percentages() {
        let history = uptrend(10); // closes 100..=109
        let snap =
            build_snapshot(&entry(), &history, Utc::now(), &StrategyParams::default()).unwrap();
        assert!((snap.price - 109.0).abs() < 1e-10);
        // 1d: 108 -> 109.
        assert!((snap.change - (1.0 / 108.0 * 100.0)).abs() < 1e-9);
        // 5d: 104 -> 109.
        assert!((snap.change_5d - (5.0 / 104.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn price_history_keeps_last_sixty_closes() {
        let history = uptrend(90);
        let snap =
            build_snapshot(&entry(), &history, Utc::now(), &StrategyParams::default()).unwrap();
        assert_eq!(snap.price_history.len(), 60);
        assert_eq!(snap.price_history[0], 130.0);
        assert_eq!(*snap.price_history.last().unwrap(), 189.0);
    }

    #[test]
    fn uptrend_end_to_end_matches_weight_table() {
        // 40 monotonically rising closes: enough for every indicator.
        let history = uptrend(40);
        let as_of = Utc::now();
        let snap = build_snapshot(&entry(), &history, as_of, &StrategyParams::default()).unwrap();

        // Momentum indicators all read bullish extension.
        assert!(snap.rsi.unwrap() > 65.0);
        assert!(snap.ema9.unwrap() > snap.ema21.unwrap());
        assert!(snap.macd.unwrap().hist > 0.0);
        assert!(snap.bb_pos.unwrap() > 0.75);
        assert!(snap.price > snap.sma20.unwrap() * 1.02);

        // Fired rows: RSI overbought (-2), MACD bullish (+1.5), EMA stack
        // (+1), upper band (-1.5), extended above SMA (+0.5) => -0.5.
        assert!((snap.score + 0.5).abs() < 1e-10);
        assert_eq!(snap.direction, Direction::Neutral);
        assert!(snap.reasons.iter().any(|r| r.starts_with("RSI overbought")));
        assert!(snap.reasons.iter().any(|r| r == "9EMA above 21EMA"));
        assert_eq!(snap.last_updated, as_of);
    }

    #[test]
    fn snapshot_serialises_with_dashboard_field_names() {
        let history = uptrend(40);
        let snap =
            build_snapshot(&entry(), &history, Utc::now(), &StrategyParams::default()).unwrap();
        let json = serde_json::to_value(&snap).unwrap();

        assert_eq!(json["sym"], "TCS");
        assert!(json["priceHistory"].is_array());
        assert!(json["bbPos"].is_number());
        assert!(json["macd"]["hist"].is_number());
        assert!(json["optionStrategy"].is_string());
        assert!(json["optionDetails"].is_object());
        assert!(json["lastUpdated"].is_string());
        assert_eq!(json["stale"], false);
    }

    #[test]
    fn degraded_indicators_serialise_as_null() {
        let history = uptrend(5);
        let snap =
            build_snapshot(&entry(), &history, Utc::now(), &StrategyParams::default()).unwrap();
        let json = serde_json::to_value(&snap).unwrap();
        assert!(json["rsi"].is_null());
        assert!(json["macd"].is_null());
        assert!(json["sma20"].is_null());
    }
}
