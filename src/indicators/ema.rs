// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The very first EMA value is seeded with the SMA of the first `period` closes.
// =============================================================================

/// Compute the EMA series for the given `closes` slice and look-back `period`.
///
/// Returns an empty `Vec` when the input is too short or the period is zero.
/// Each output element corresponds to a close starting at index `period - 1`.
///
/// # Edge cases
/// - `period == 0` => empty vec (division by zero guard)
/// - `closes.len() < period` => empty vec
/// - A non-finite intermediate value truncates the series; downstream
///   consumers should not trust a broken tail.
pub fn ema_series(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period + 1) as f64;

    // Seed: SMA of the first `period` values.
    let seed: f64 = closes[..period].iter().sum::<f64>() / period as f64;
    if !seed.is_finite() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(closes.len() - period + 1);
    result.push(seed);

    let mut prev = seed;
    for &close in &closes[period..] {
        let ema = close * multiplier + prev * (1.0 - multiplier);
        if !ema.is_finite() {
            break;
        }
        result.push(ema);
        prev = ema;
    }

    result
}

/// Most recent EMA value, or `None` when the series is too short.
pub fn latest_ema(closes: &[f64], period: usize) -> Option<f64> {
    ema_series(closes, period).last().copied()
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn ascending(n: usize) -> Vec<f64> {
        (1..=n).map(|i| i as f64).collect()
    }

    #[test]
    fn ema_empty_input() {
        assert!(ema_series(&[], 5).is_empty());
    }

    #[test]
    fn ema_period_zero() {
        assert!(ema_series(&[1.0, 2.0, 3.0], 0).is_empty());
    }

    #[test]
    fn ema_insufficient_data() {
        assert!(ema_series(&[1.0, 2.0], 5).is_empty());
        assert!(latest_ema(&[1.0, 2.0], 5).is_none());
    }

    #[test]
    fn ema_period_equals_length_is_sma() {
        let ema = ema_series(&[2.0, 4.0, 6.0], 3);
        assert_eq!(ema.len(), 1);
        assert!((ema[0] - 4.0).abs() < 1e-10);
    }

    #[test]
    fn ema_known_values() {
        // 5-period EMA of 1..=10: seed = 3.0, multiplier = 1/3.
        let closes = ascending(10);
        let ema = ema_series(&closes, 5);
        assert_eq!(ema.len(), 6);

        let mult = 2.0 / 6.0;
        let mut expected = 3.0;
        for (i, &c) in closes[5..].iter().enumerate() {
            expected = c * mult + expected * (1.0 - mult);
            assert!((ema[i + 1] - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn ema_tracks_rising_prices_from_below() {
        let closes = ascending(50);
        let ema = latest_ema(&closes, 9).unwrap();
        // EMA lags price in a steady uptrend.
        assert!(ema < 50.0);
        assert!(ema > 40.0);
    }

    #[test]
    fn ema_handles_nan_in_input() {
        let closes = vec![1.0, 2.0, 3.0, f64::NAN, 5.0];
        let ema = ema_series(&closes, 3);
        // Seed is fine, the NaN close truncates the rest.
        assert_eq!(ema.len(), 1);
    }
}
