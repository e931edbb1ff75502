// =============================================================================
// Moving Average Convergence Divergence (MACD 12/26/9)
// =============================================================================
//
//   macd line = EMA12 - EMA26
//   signal    = EMA9 of the macd line
//   histogram = macd line - signal
//
// With SMA-seeded EMAs the line is first defined at 26 closes and the signal
// once nine line values exist. Both series are aligned on close index before
// subtracting.
// =============================================================================

use super::ema::ema_series;

const FAST: usize = 12;
const SLOW: usize = 26;
const SIGNAL: usize = 9;

/// Latest MACD values for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Macd {
    pub macd: f64,
    pub signal: f64,
    pub hist: f64,
}

/// Compute the MACD line series (EMA12 - EMA26), one value per close starting
/// at index `SLOW - 1`. Empty when fewer than 26 closes exist.
pub fn macd_line_series(closes: &[f64]) -> Vec<f64> {
    if closes.len() < SLOW {
        return Vec::new();
    }

    let fast = ema_series(closes, FAST);
    let slow = ema_series(closes, SLOW);

    // fast[i] belongs to close index i + FAST - 1, slow[j] to j + SLOW - 1.
    // Overlap starts where the slow EMA starts.
    let offset = SLOW - FAST;
    fast.iter()
        .skip(offset)
        .zip(slow.iter())
        .map(|(f, s)| f - s)
        .collect()
}

/// Latest MACD line, signal line and histogram.
///
/// The triple is all-or-nothing: between 26 and 33 closes the line exists
/// but the signal does not yet, and the whole value stays `None` rather
/// than surfacing a line with no histogram. Defined from 34 closes on
/// (nine MACD line values). Callers wanting the bare line in that window
/// use [`macd_line_series`] directly.
pub fn latest_macd(closes: &[f64]) -> Option<Macd> {
    let line = macd_line_series(closes);
    let signal_series = ema_series(&line, SIGNAL);

    let macd = *line.last()?;
    let signal = *signal_series.last()?;
    let hist = macd - signal;

    hist.is_finite().then_some(Macd { macd, signal, hist })
}
