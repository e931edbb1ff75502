// =============================================================================
// Bollinger Bands (20, 2)
// =============================================================================
//
// Middle band = SMA20, upper/lower = mid ± k·σ where σ is the population
// standard deviation over the same window. The band position normalises the
// last price into [0, 1] between the lower and upper band.

/// Result of a Bollinger Band calculation.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bollinger {
    pub upper: f64,
    pub mid: f64,
    pub lower: f64,
}

/// Calculate Bollinger Bands over the trailing `period` closes.
///
/// Returns `None` when fewer than `period` data points exist or the result
/// is non-finite.
pub fn latest_bollinger(closes: &[f64], period: usize, num_std: f64) -> Option<Bollinger> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let window = &closes[closes.len() - period..];
    let mid = window.iter().sum::<f64>() / period as f64;

    let variance = window.iter().map(|x| (x - mid).powi(2)).sum::<f64>() / period as f64;
    let std_dev = variance.sqrt();

    let upper = mid + num_std * std_dev;
    let lower = mid - num_std * std_dev;

    (upper.is_finite() && lower.is_finite()).then_some(Bollinger { upper, mid, lower })
}

/// Normalised position of `price` within the bands, clamped to [0, 1].
///
/// Defined as 0.5 when the band width is zero (flat window).
pub fn band_position(price: f64, bands: &Bollinger) -> f64 {
    let width = bands.upper - bands.lower;
    if width <= 0.0 {
        return 0.5;
    }
    ((price - bands.lower) / width).clamp(0.0, 1.0)
}
