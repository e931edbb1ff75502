// =============================================================================
// Average True Range (ATR) — Wilder's Smoothing Method
// =============================================================================
//
// ATR measures volatility by decomposing the entire range of a bar.
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is then the smoothed average of TR using Wilder's method:
//   ATR_0   = SMA of first `period` TR values
//   ATR_t   = (ATR_{t-1} * (period - 1) + TR_t) / period
// =============================================================================

/// Compute the most recent ATR value from parallel high/low/close series
/// (oldest first) using Wilder's smoothing.
///
/// Returns `None` when:
/// - `period` is zero.
/// - The three series have mismatched lengths.
/// - There are fewer than `period + 1` bars (each TR needs a previous close).
/// - Any intermediate value is non-finite.
pub fn latest_atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Option<f64> {
    let n = closes.len();
    if period == 0 || highs.len() != n || lows.len() != n || n < period + 1 {
        return None;
    }

    // True range per bar, starting at the second bar.
    let mut tr_values = Vec::with_capacity(n - 1);
    for i in 1..n {
        let hl = highs[i] - lows[i];
        let hc = (highs[i] - closes[i - 1]).abs();
        let lc = (lows[i] - closes[i - 1]).abs();
        tr_values.push(hl.max(hc).max(lc));
    }

    // Seed with the SMA of the first `period` TR values.
    let seed: f64 = tr_values[..period].iter().sum::<f64>() / period as f64;
    if !seed.is_finite() {
        return None;
    }

    let period_f = period as f64;
    let mut atr = seed;
    for &tr in &tr_values[period..] {
        atr = (atr * (period_f - 1.0) + tr) / period_f;
        if !atr.is_finite() {
            return None;
        }
    }

    Some(atr)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    /// Parallel OHLC series with constant range around a drifting base.
    fn constant_range(n: usize, half_range: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let mut highs = Vec::new();
        let mut lows = Vec::new();
        let mut closes = Vec::new();
        for i in 0..n {
            let base = 100.0 + i as f64 * 0.1;
            highs.push(base + half_range);
            lows.push(base - half_range);
            closes.push(base);
        }
        (highs, lows, closes)
    }

    #[test]
    fn atr_period_zero() {
        let (h, l, c) = constant_range(20, 5.0);
        assert!(latest_atr(&h, &l, &c, 0).is_none());
    }

    #[test]
    fn atr_insufficient_data() {
        let (h, l, c) = constant_range(10, 5.0);
        assert!(latest_atr(&h, &l, &c, 14).is_none());
    }

    #[test]
    fn atr_mismatched_lengths() {
        let (h, _, c) = constant_range(20, 5.0);
        let short_lows = vec![95.0; 19];
        assert!(latest_atr(&h, &short_lows, &c, 14).is_none());
    }

    #[test]
    fn atr_constant_range_converges() {
        let (h, l, c) = constant_range(30, 5.0);
        let atr = latest_atr(&h, &l, &c, 14).unwrap();
        assert!((atr - 10.0).abs() < 1.0, "expected ATR near 10.0, got {atr}");
    }

    #[test]
    fn atr_true_range_uses_prev_close() {
        // Gap up: |H - prevClose| exceeds H - L.
        let highs = vec![105.0, 115.0, 118.0, 120.0];
        let lows = vec![95.0, 108.0, 110.0, 113.0];
        let closes = vec![95.0, 112.0, 115.0, 118.0];
        let atr = latest_atr(&highs, &lows, &closes, 3).unwrap();
        // First TR = |115 - 95| = 20, so ATR must reflect the gap.
        assert!(atr > 7.0, "ATR should reflect the gap, got {atr}");
    }

    #[test]
    fn atr_is_positive() {
        let (h, l, c) = constant_range(50, 2.0);
        let atr = latest_atr(&h, &l, &c, 14).unwrap();
        assert!(atr > 0.0);
        assert!(atr.is_finite());
    }

    #[test]
    fn atr_nan_returns_none() {
        let (mut h, l, c) = constant_range(20, 5.0);
        h[10] = f64::NAN;
        assert!(latest_atr(&h, &l, &c, 14).is_none());
    }
}
