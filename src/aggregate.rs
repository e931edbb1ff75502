// =============================================================================
// Aggregator — universe-level statistics derived on read
// =============================================================================
//
// Nothing here is cached: breadth counts and top picks are recomputed from
// the current generation on every request, so they can never drift from the
// snapshot set they describe.

use serde::Serialize;

use crate::snapshot::Snapshot;
use crate::types::Direction;

/// Breadth summary for the dashboard bar. Percentages are computed from the
/// actual generation size, never a hardcoded universe count.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub longs: usize,
    pub shorts: usize,
    pub neutrals: usize,
    pub total: usize,
    #[serde(rename = "longPct")]
    pub long_pct: u32,
    #[serde(rename = "shortPct")]
    pub short_pct: u32,
}

/// Highest-confidence directional calls in the generation.
#[derive(Debug, Clone, Serialize)]
pub struct TopPicks {
    pub long: Vec<String>,
    pub short: Vec<String>,
}

/// Count directions across a generation's snapshots.
pub fn summarize(snapshots: &[Snapshot]) -> Summary {
    let total = snapshots.len();
    let longs = count(snapshots, Direction::Long);
    let shorts = count(snapshots, Direction::Short);
    let neutrals = count(snapshots, Direction::Neutral);

    Summary {
        longs,
        shorts,
        neutrals,
        total,
        long_pct: pct(longs, total),
        short_pct: pct(shorts, total),
    }
}

/// Top `n` long and short symbols by confidence.
pub fn top_picks(snapshots: &[Snapshot], n: usize) -> TopPicks {
    TopPicks {
        long: ranked(snapshots, Direction::Long, n),
        short: ranked(snapshots, Direction::Short, n),
    }
}

fn count(snapshots: &[Snapshot], direction: Direction) -> usize {
    snapshots.iter().filter(|s| s.direction == direction).count()
}

fn pct(part: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        (part as f64 / total as f64 * 100.0).round() as u32
    }
}

fn ranked(snapshots: &[Snapshot], direction: Direction, n: usize) -> Vec<String> {
    let mut picks: Vec<&Snapshot> = snapshots
        .iter()
        .filter(|s| s.direction == direction)
        .collect();
    picks.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    picks.into_iter().take(n).map(|s| s.sym.clone()).collect()
}
