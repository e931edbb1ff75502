// =============================================================================
// Strategy Selector — maps (direction, confidence) to an options template
// =============================================================================
//
// Pure lookup, fixed 70% confidence threshold:
//
//   LONG    > 70   Bull Call Spread   buy ATM call, sell OTM call above
//   LONG    <= 70  ATM Call Buy       buy ATM call
//   SHORT   > 70   Bear Put Spread    buy ATM put, sell OTM put below
//   SHORT   <= 70  ATM Put Buy        buy ATM put
//   NEUTRAL any    Iron Condor        sell OTM call+put, buy wings further out
//
// Strikes anchor on the nearest standard NSE strike increment; spread offsets
// are percentage-of-price distances from `StrategyParams`, never fixed rupee
// amounts. Premium/target estimates are ATR-scaled ballparks for the
// dashboard, not quotes.
// =============================================================================

use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::runtime_config::StrategyParams;
use crate::types::Direction;

/// Confidence above which a directional signal earns a spread instead of a
/// naked buy.
pub const SPREAD_CONFIDENCE_MIN: u32 = 70;

// ATR multipliers behind the rupee estimates shown on the dashboard.
const SPREAD_MAX_PROFIT_ATR: f64 = 3.0;
const SPREAD_MAX_LOSS_ATR: f64 = 1.5;
const SPREAD_PREMIUM_ATR: f64 = 1.2;
const NAKED_PREMIUM_ATR: f64 = 0.8;
const CONDOR_PREMIUM_ATR: f64 = 0.6;

/// A selected strategy template with concrete legs.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyPick {
    pub name: &'static str,
    pub details: OptionDetails,
}

/// Per-strategy leg shape. Serialises untagged: the strategy name travels
/// separately in the snapshot, and each variant carries its own fixed fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionDetails {
    Spread {
        buy: String,
        sell: String,
        expiry: String,
        #[serde(rename = "maxProfit")]
        max_profit: String,
        #[serde(rename = "maxLoss")]
        max_loss: String,
        premium: String,
    },
    NakedBuy {
        buy: String,
        expiry: String,
        target: String,
        #[serde(rename = "stopLoss")]
        stop_loss: String,
        premium: String,
    },
    IronCondor {
        #[serde(rename = "sellCall")]
        sell_call: String,
        #[serde(rename = "buyCall")]
        buy_call: String,
        #[serde(rename = "sellPut")]
        sell_put: String,
        #[serde(rename = "buyPut")]
        buy_put: String,
        expiry: String,
        premium: String,
    },
}

/// Round `price` to the nearest standard NSE strike increment.
///
/// Increments scale with price level: 100 above 5000, 50 above 1000, 20
/// above 500, otherwise 10.
pub fn round_to_strike(price: f64) -> i64 {
    let step = if price > 5000.0 {
        100.0
    } else if price > 1000.0 {
        50.0
    } else if price > 500.0 {
        20.0
    } else {
        10.0
    };
    ((price / step).round() * step) as i64
}

/// Next weekly NSE index/equity option expiry (Thursday) strictly after
/// `today`, formatted like `12 Mar '26`.
pub fn next_weekly_expiry(today: NaiveDate) -> String {
    let days_ahead = (Weekday::Thu.num_days_from_monday() + 7
        - today.weekday().num_days_from_monday())
        % 7;
    let days_ahead = if days_ahead == 0 { 7 } else { days_ahead };
    let expiry = today
        .checked_add_days(Days::new(days_ahead as u64))
        .unwrap_or(today);
    expiry.format("%d %b '%y").to_string()
}

/// Select the options strategy for one symbol.
///
/// `atr` scales the premium/target estimates; when the indicator was
/// degraded, 1% of price stands in so the legs still render.
pub fn select(
    direction: Direction,
    confidence: u32,
    symbol: &str,
    price: f64,
    atr: Option<f64>,
    params: &StrategyParams,
) -> StrategyPick {
    select_for_date(
        direction,
        confidence,
        symbol,
        price,
        atr,
        params,
        Utc::now().date_naive(),
    )
}

/// Deterministic core of [`select`], parameterised on the evaluation date.
pub fn select_for_date(
    direction: Direction,
    confidence: u32,
    symbol: &str,
    price: f64,
    atr: Option<f64>,
    params: &StrategyParams,
    today: NaiveDate,
) -> StrategyPick {
    let atr = atr.unwrap_or(price * 0.01);
    let strike = round_to_strike(price);
    let expiry = next_weekly_expiry(today);
    let offset = params.spread_offset_pct / 100.0;

    match direction {
        Direction::Long if confidence > SPREAD_CONFIDENCE_MIN => StrategyPick {
            name: "Bull Call Spread",
            details: OptionDetails::Spread {
                buy: format!("{symbol} {strike} CE"),
                sell: format!("{symbol} {} CE", round_to_strike(price * (1.0 + offset))),
                expiry,
                max_profit: rupees(atr * SPREAD_MAX_PROFIT_ATR),
                max_loss: rupees(atr * SPREAD_MAX_LOSS_ATR),
                premium: rupees(atr * SPREAD_PREMIUM_ATR),
            },
        },
        Direction::Long => StrategyPick {
            name: "ATM Call Buy",
            details: OptionDetails::NakedBuy {
                buy: format!("{symbol} {strike} CE"),
                expiry,
                target: rupees_exact(price * (1.0 + params.target_pct / 100.0)),
                stop_loss: rupees_exact(price * (1.0 - params.stop_pct / 100.0)),
                premium: rupees(atr * NAKED_PREMIUM_ATR),
            },
        },
        Direction::Short if confidence > SPREAD_CONFIDENCE_MIN => StrategyPick {
            name: "Bear Put Spread",
            details: OptionDetails::Spread {
                buy: format!("{symbol} {strike} PE"),
                sell: format!("{symbol} {} PE", round_to_strike(price * (1.0 - offset))),
                expiry,
                max_profit: rupees(atr * SPREAD_MAX_PROFIT_ATR),
                max_loss: rupees(atr * SPREAD_MAX_LOSS_ATR),
                premium: rupees(atr * SPREAD_PREMIUM_ATR),
            },
        },
        Direction::Short => StrategyPick {
            name: "ATM Put Buy",
            details: OptionDetails::NakedBuy {
                buy: format!("{symbol} {strike} PE"),
                expiry,
                target: rupees_exact(price * (1.0 - params.target_pct / 100.0)),
                stop_loss: rupees_exact(price * (1.0 + params.stop_pct / 100.0)),
                premium: rupees(atr * NAKED_PREMIUM_ATR),
            },
        },
        Direction::Neutral => {
            let inner = params.condor_inner_pct / 100.0;
            let outer = params.condor_outer_pct / 100.0;
            StrategyPick {
                name: "Iron Condor",
                details: OptionDetails::IronCondor {
                    sell_call: format!("{symbol} {} CE", round_to_strike(price * (1.0 + inner))),
                    buy_call: format!("{symbol} {} CE", round_to_strike(price * (1.0 + outer))),
                    sell_put: format!("{symbol} {} PE", round_to_strike(price * (1.0 - inner))),
                    buy_put: format!("{symbol} {} PE", round_to_strike(price * (1.0 - outer))),
                    expiry,
                    premium: rupees(atr * CONDOR_PREMIUM_ATR),
                },
            }
        }
    }
}

fn rupees(v: f64) -> String {
    format!("₹{}", v.round() as i64)
}

fn rupees_exact(v: f64) -> String {
    format!("₹{v:.2}")
}
