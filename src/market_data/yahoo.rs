// =============================================================================
// Yahoo Finance chart client — free daily OHLC, ~15 min delayed for NSE
// =============================================================================
//
// Uses the public v8 chart endpoint:
//   GET /v8/finance/chart/{TICKER}?range={range}&interval=1d
//
// NSE equities are suffixed ".NS"; the NIFTY 50 index is "^NSEI". Bars with
// missing close/high/low values (holidays, partial sessions) are dropped so
// the three series stay parallel.
// =============================================================================

use reqwest::StatusCode;
use tracing::debug;

use crate::market_data::provider::{PriceHistory, QuoteProvider};
use crate::types::{IndexSnapshot, ProviderError};

/// NIFTY 50 index ticker, percent-encoded for the URL path.
const INDEX_TICKER: &str = "%5ENSEI";

/// Yahoo Finance REST client.
#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent("Mozilla/5.0 (compatible; swing-scanner/1.0)")
            .build()
            .expect("failed to build reqwest client");

        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            client,
        }
    }

    /// Smallest Yahoo range string covering `days` trading days.
    fn range_for(days: usize) -> &'static str {
        match days {
            0..=20 => "1mo",
            21..=62 => "3mo",
            63..=125 => "6mo",
            _ => "1y",
        }
    }

    /// Fetch and decode one chart document.
    async fn fetch_chart(&self, ticker: &str, range: &str) -> Result<serde_json::Value, ProviderError> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d",
            self.base_url, ticker, range
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Transient(format!("request failed: {e}")))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::Fatal(format!("unknown ticker {ticker}")));
        }
        if !status.is_success() {
            // Rate limits and upstream 5xx are retryable on the next pass.
            return Err(ProviderError::Transient(format!(
                "chart request for {ticker} returned {status}"
            )));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::Transient(format!("invalid chart body: {e}")))?;

        if !body["chart"]["error"].is_null() {
            return Err(ProviderError::Fatal(format!(
                "chart error for {ticker}: {}",
                body["chart"]["error"]
            )));
        }

        Ok(body)
    }

    /// Extract parallel close/high/low series from a chart document, dropping
    /// bars where any of the three is null.
    fn parse_history(body: &serde_json::Value) -> Result<PriceHistory, ProviderError> {
        let quote = &body["chart"]["result"][0]["indicators"]["quote"][0];
        let (Some(closes), Some(highs), Some(lows)) = (
            quote["close"].as_array(),
            quote["high"].as_array(),
            quote["low"].as_array(),
        ) else {
            return Err(ProviderError::Fatal("chart result missing quote arrays".into()));
        };

        let mut history = PriceHistory::default();
        for i in 0..closes.len().min(highs.len()).min(lows.len()) {
            let (Some(c), Some(h), Some(l)) =
                (closes[i].as_f64(), highs[i].as_f64(), lows[i].as_f64())
            else {
                continue; // null bar — skip it whole to keep series parallel
            };
            history.closes.push(c);
            history.highs.push(h);
            history.lows.push(l);
        }

        Ok(history)
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteProvider for YahooClient {
    async fn daily_history(
        &self,
        symbol: &str,
        days: usize,
    ) -> Result<PriceHistory, ProviderError> {
        let ticker = format!("{symbol}.NS");
        let body = self.fetch_chart(&ticker, Self::range_for(days)).await?;
        let history = Self::parse_history(&body)?;

        debug!(symbol, bars = history.len(), "daily history fetched");
        Ok(history)
    }

    async fn index_quote(&self) -> Result<IndexSnapshot, ProviderError> {
        let body = self.fetch_chart(INDEX_TICKER, "5d").await?;
        let history = Self::parse_history(&body)?;

        let price = history
            .last_close()
            .ok_or_else(|| ProviderError::Transient("index history empty".into()))?;
        let prev = if history.len() > 1 {
            history.closes[history.len() - 2]
        } else {
            price
        };

        let change = price - prev;
        let change_pct = if prev != 0.0 { change / prev * 100.0 } else { 0.0 };

        Ok(IndexSnapshot {
            price,
            change,
            change_pct,
        })
    }
}
