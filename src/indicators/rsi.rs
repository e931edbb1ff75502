// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an instrument is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Seed average gain / average loss with the SMA of the first `period`
//          gains / losses.
// Step 3 — Apply Wilder's exponential smoothing:
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS), clamped to [0, 100]
//
// When the average loss is zero there are no down moves in the window and
// RSI is pinned at 100.
// =============================================================================

/// Compute the full RSI series for the given `closes` and `period`.
///
/// The returned vector has one RSI value for each close starting at index
/// `period` (the first `period` closes are consumed to seed the averages).
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - `closes.len() < period + 1` => empty vec (need at least `period` deltas)
/// - Average loss of zero => RSI = 100.0
/// - A non-finite value truncates the series.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period + 1 {
        return Vec::new();
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    // Seed averages with the SMA of the first `period` deltas.
    let (sum_gain, sum_loss) = deltas[..period]
        .iter()
        .fold((0.0_f64, 0.0_f64), |(g, l), &d| {
            if d > 0.0 {
                (g + d, l)
            } else {
                (g, l + d.abs())
            }
        });

    let period_f = period as f64;
    let mut avg_gain = sum_gain / period_f;
    let mut avg_loss = sum_loss / period_f;

    let Some(first) = rsi_from_averages(avg_gain, avg_loss) else {
        return Vec::new();
    };

    let mut result = Vec::with_capacity(deltas.len() - period + 1);
    result.push(first);

    // Wilder's smoothing for subsequent values.
    for &delta in &deltas[period..] {
        let gain = if delta > 0.0 { delta } else { 0.0 };
        let loss = if delta < 0.0 { delta.abs() } else { 0.0 };

        avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;

        match rsi_from_averages(avg_gain, avg_loss) {
            Some(rsi) => result.push(rsi),
            None => break,
        }
    }

    result
}

/// Most recent RSI value, or `None` when there is insufficient history.
pub fn latest_rsi(closes: &[f64], period: usize) -> Option<f64> {
    rsi_series(closes, period).last().copied()
}

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 {
        100.0 // No down moves in the window.
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    rsi.is_finite().then(|| rsi.clamp(0.0, 100.0))
}
