// =============================================================================
// Shared types used across the swing scanner
// =============================================================================

use serde::{Deserialize, Serialize};

/// Directional call for a single symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
    Neutral,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Latest quote for the index reference instrument (NIFTY 50).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub price: f64,
    pub change: f64,
    #[serde(rename = "changePct")]
    pub change_pct: f64,
}

/// Failure modes of the market-data provider.
///
/// `Transient` covers rate limits, timeouts and upstream 5xx — the symbol's
/// previous snapshot is carried forward as stale. `Fatal` covers unknown or
/// delisted symbols — the symbol is omitted from the generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    Transient(String),
    Fatal(String),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transient(msg) => write!(f, "transient provider error: {msg}"),
            Self::Fatal(msg) => write!(f, "fatal provider error: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}
