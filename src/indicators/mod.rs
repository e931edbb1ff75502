// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators used by the
// scanner. Every public function returns `Option<T>` so callers are forced
// to handle insufficient-history and numerical-edge-case scenarios: a `None`
// degrades that indicator only, never the whole symbol.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use bollinger::Bollinger;
pub use macd::Macd;

use serde::{Deserialize, Serialize};

use crate::market_data::PriceHistory;

/// Standard look-back windows used across the universe.
pub const RSI_PERIOD: usize = 14;
pub const EMA_FAST: usize = 9;
pub const EMA_SLOW: usize = 21;
pub const SMA_PERIOD: usize = 20;
pub const BB_PERIOD: usize = 20;
pub const BB_STD: f64 = 2.0;
pub const ATR_PERIOD: usize = 14;

/// All computed indicator values for one symbol.
///
/// Each field is `None` when the price series was too short for that
/// indicator's window; the rest still compute. The set is recomputed
/// wholesale on every refresh, never patched incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub rsi: Option<f64>,
    pub macd: Option<Macd>,
    pub sma20: Option<f64>,
    pub ema9: Option<f64>,
    pub ema21: Option<f64>,
    pub atr: Option<f64>,
    pub bollinger: Option<Bollinger>,
    /// Price's normalised position between the lower and upper band, [0, 1].
    pub bb_pos: Option<f64>,
}

impl IndicatorSet {
    /// Compute every indicator from one symbol's daily history.
    pub fn compute(history: &PriceHistory) -> Self {
        let closes = &history.closes;

        let bands = bollinger::latest_bollinger(closes, BB_PERIOD, BB_STD);
        let bb_pos = match (history.last_close(), bands.as_ref()) {
            (Some(price), Some(b)) => Some(bollinger::band_position(price, b)),
            _ => None,
        };

        Self {
            rsi: rsi::latest_rsi(closes, RSI_PERIOD),
            macd: macd::latest_macd(closes),
            sma20: sma::latest_sma(closes, SMA_PERIOD),
            ema9: ema::latest_ema(closes, EMA_FAST),
            ema21: ema::latest_ema(closes, EMA_SLOW),
            atr: atr::latest_atr(&history.highs, &history.lows, closes, ATR_PERIOD),
            bollinger: bands,
            bb_pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(n: usize) -> PriceHistory {
        let closes: Vec<f64> = (0..n)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * 5.0 + i as f64 * 0.2)
            .collect();
        PriceHistory {
            highs: closes.iter().map(|c| c + 1.5).collect(),
            lows: closes.iter().map(|c| c - 1.5).collect(),
            closes,
        }
    }

    #[test]
    fn full_history_computes_everything() {
        let set = IndicatorSet::compute(&history(60));
        assert!(set.rsi.is_some());
        assert!(set.macd.is_some());
        assert!(set.sma20.is_some());
        assert!(set.ema9.is_some());
        assert!(set.ema21.is_some());
        assert!(set.atr.is_some());
        assert!(set.bollinger.is_some());
        assert!(set.bb_pos.is_some());
    }

    #[test]
    fn short_history_degrades_per_indicator() {
        // 16 bars: RSI(14) and EMA9 compute, the 20/26-window ones do not.
        let set = IndicatorSet::compute(&history(16));
        assert!(set.rsi.is_some());
        assert!(set.ema9.is_some());
        assert!(set.sma20.is_none());
        assert!(set.macd.is_none());
        assert!(set.bollinger.is_none());
        assert!(set.bb_pos.is_none());
    }

    #[test]
    fn empty_history_degrades_all() {
        let set = IndicatorSet::compute(&PriceHistory::default());
        assert!(set.rsi.is_none());
        assert!(set.macd.is_none());
        assert!(set.sma20.is_none());
        assert!(set.ema9.is_none());
        assert!(set.ema21.is_none());
        assert!(set.atr.is_none());
        assert!(set.bollinger.is_none());
        assert!(set.bb_pos.is_none());
    }
}
