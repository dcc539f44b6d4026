//! Support and resistance levels from pivot extrema.

use serde::Serialize;

use crate::indicators::IndicatorSeries;
use crate::series::Candle;
use crate::Period;

/// How many distinct levels to retain per side (the highest ones, after an
/// ascending sort).
pub const MAX_LEVELS: usize = 3;

/// Detected price levels.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LevelScan {
    /// Distinct pivot-low levels, ascending.
    pub support_levels: Vec<f64>,
    /// Distinct pivot-high levels, ascending.
    pub resistance_levels: Vec<f64>,
    /// Latest fast (50-period) SMA, acting as dynamic support.
    pub dynamic_support: Option<f64>,
    /// Latest slow (200-period) SMA, acting as dynamic resistance.
    pub dynamic_resistance: Option<f64>,
}

/// Identify support/resistance levels via a pivot scan of window `w`.
///
/// Index `i` (for `w <= i < n - w`) is a support candidate when its low
/// equals the minimum low over `[i - w, i + w]`, and a resistance candidate
/// symmetrically on highs. Candidates are deduplicated, sorted ascending,
/// and trimmed to the top [`MAX_LEVELS`]. A series shorter than `2w`
/// produces an empty scan.
pub fn identify_support_resistance(
    candles: &[Candle],
    window: Period,
    sma_fast: &IndicatorSeries,
    sma_slow: &IndicatorSeries,
) -> LevelScan {
    let w = window.get();
    let n = candles.len();
    if n < w * 2 {
        return LevelScan::default();
    }

    let mut support = Vec::new();
    let mut resistance = Vec::new();

    for i in w..n - w {
        let neighborhood = &candles[i - w..=i + w];
        let low = candles[i].low;
        if neighborhood.iter().all(|c| low <= c.low) {
            support.push(low);
        }
        let high = candles[i].high;
        if neighborhood.iter().all(|c| high >= c.high) {
            resistance.push(high);
        }
    }

    LevelScan {
        support_levels: top_distinct(support),
        resistance_levels: top_distinct(resistance),
        dynamic_support: sma_fast.last(),
        dynamic_resistance: sma_slow.last(),
    }
}

/// Sort ascending, drop duplicates, keep the last [`MAX_LEVELS`] entries.
fn top_distinct(mut levels: Vec<f64>) -> Vec<f64> {
    levels.sort_by(f64::total_cmp);
    levels.dedup();
    let excess = levels.len().saturating_sub(MAX_LEVELS);
    levels.drain(..excess);
    levels
}

// ============================================================
// TESTS
// ============================================================
