// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================

/// Arithmetic mean of the trailing `period` closes.
///
/// Returns `None` when fewer than `period` points exist, when `period` is
/// zero, or when the mean is non-finite.
pub fn latest_sma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let window = &closes[closes.len() - period..];
    let mean = window.iter().sum::<f64>() / period as f64;
    mean.is_finite().then_some(mean)
}
