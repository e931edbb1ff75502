// =============================================================================
// Composite Scoring Engine — weighted indicator contributions
// =============================================================================
//
// Each row of the weight table fires independently; several can contribute at
// once. A missing indicator simply skips its rows, so a short history drifts
// toward a NEUTRAL, low-confidence signal instead of failing the symbol.
//
//   RSI < 35              +2.0     RSI > 65              -2.0
//   MACD hist > 0         +1.5     MACD hist < 0         -1.5
//   EMA9 > EMA21          +1.0     EMA9 < EMA21          -1.0
//   bb_pos < 0.25         +1.5     bb_pos > 0.75         -1.5
//   price > SMA20*1.02    +0.5     price < SMA20*0.98    -0.5
//
// Direction: score >= 1 LONG, score <= -1 SHORT, otherwise NEUTRAL.
// Confidence: min(100, round(|score| / 7.0 * 100)) — 7.0 is the maximum
// attainable magnitude of the table, which keeps the 70% strategy threshold
// meaningful.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorSet;
use crate::types::Direction;

/// Maximum attainable |score| of the weight table; the confidence divisor.
pub const MAX_SCORE: f64 = 7.0;

/// Directional signal for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub score: f64,
    pub direction: Direction,
    /// 0–100.
    pub confidence: u32,
    /// One human-readable entry per fired contribution, in table row order.
    pub reasons: Vec<String>,
}

/// Map a composite score onto a direction label.
///
/// The boundaries are inclusive: exactly 1.0 is LONG, exactly -1.0 is SHORT.
pub fn direction_for(score: f64) -> Direction {
    if score >= 1.0 {
        Direction::Long
    } else if score <= -1.0 {
        Direction::Short
    } else {
        Direction::Neutral
    }
}

/// Monotonic normalisation of |score| onto 0–100.
pub fn confidence_for(score: f64) -> u32 {
    let pct = (score.abs() / MAX_SCORE * 100.0).round();
    (pct as u32).min(100)
}

/// Score one symbol's indicator set against the weight table.
pub fn evaluate(ind: &IndicatorSet, price: f64) -> Signal {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    if let Some(rsi) = ind.rsi {
        if rsi < 35.0 {
            score += 2.0;
            reasons.push(format!("RSI oversold ({rsi:.1})"));
        } else if rsi > 65.0 {
            score -= 2.0;
            reasons.push(format!("RSI overbought ({rsi:.1})"));
        }
    }

    if let Some(macd) = ind.macd {
        if macd.hist > 0.0 {
            score += 1.5;
            reasons.push("MACD bullish crossover".to_string());
        } else if macd.hist < 0.0 {
            score -= 1.5;
            reasons.push("MACD bearish crossover".to_string());
        }
    }

    if let (Some(ema9), Some(ema21)) = (ind.ema9, ind.ema21) {
        if ema9 > ema21 {
            score += 1.0;
            reasons.push("9EMA above 21EMA".to_string());
        } else if ema9 < ema21 {
            score -= 1.0;
            reasons.push("9EMA below 21EMA".to_string());
        }
    }

    if let Some(bb_pos) = ind.bb_pos {
        if bb_pos < 0.25 {
            score += 1.5;
            reasons.push(format!("Price near BB lower band ({bb_pos:.2})"));
        } else if bb_pos > 0.75 {
            score -= 1.5;
            reasons.push(format!("Price near BB upper band ({bb_pos:.2})"));
        }
    }

    if let Some(sma20) = ind.sma20 {
        if price > sma20 * 1.02 {
            score += 0.5;
            reasons.push("Price extended above 20SMA".to_string());
        } else if price < sma20 * 0.98 {
            score -= 0.5;
            reasons.push("Price extended below 20SMA".to_string());
        }
    }

    Signal {
        score,
        direction: direction_for(score),
        confidence: confidence_for(score),
        reasons,
    }
}
