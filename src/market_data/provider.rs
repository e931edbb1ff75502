// =============================================================================
// Market-data provider contract
// =============================================================================
//
// The refresh pass is generic over `QuoteProvider` so the cache machinery can
// be exercised in tests with a deterministic in-memory provider while
// production uses the Yahoo Finance client.

use crate::types::{IndexSnapshot, ProviderError};

/// Daily OHLC history for one symbol, oldest bar first.
///
/// The three series are parallel: index `i` of each refers to the same
/// trading day. Owned by the refresh pass that requested it and never
/// mutated after the fetch.
#[derive(Debug, Clone, Default)]
pub struct PriceHistory {
    pub closes: Vec<f64>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
}

impl PriceHistory {
    /// Last close, if any bars exist.
    pub fn last_close(&self) -> Option<f64> {
        self.closes.last().copied()
    }

    /// Number of trading days covered.
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// A source of daily price data for the tracked universe.
///
/// Callers only use this through generic bounds resolved to concrete types,
/// so the auto-trait leakage of `async fn` in traits is not a concern here.
#[allow(async_fn_in_trait)]
pub trait QuoteProvider: Send + Sync {
    /// Fetch roughly the last `days` trading days of daily OHLC for `symbol`.
    async fn daily_history(&self, symbol: &str, days: usize)
        -> Result<PriceHistory, ProviderError>;

    /// Latest quote for the index reference instrument.
    async fn index_quote(&self) -> Result<IndexSnapshot, ProviderError>;
}
