//! Candlestick pattern detection at the latest bar.
//!
//! Patterns are supplementary signals, so detection fails soft: short input,
//! degenerate bars, and zero-variance windows all yield an empty scan rather
//! than an error.

use serde::{Deserialize, Serialize};

use crate::series::Candle;
use crate::Period;

/// Body at or below this fraction of the bar's range counts as a doji.
pub const DOJI_BODY_RATIO: f64 = 0.1;
/// Absolute z-score beyond which a candle body counts as a statistical
/// extreme.
pub const EXTREME_Z_SCORE: f64 = 2.0;

/// Patterns recognized at the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandlePattern {
    Doji,
    InsideBar,
    BullishExtreme,
    BearishExtreme,
}

impl CandlePattern {
    pub fn description(&self) -> &'static str {
        match self {
            CandlePattern::Doji => "Doji pattern detected - potential reversal",
            CandlePattern::InsideBar => "Inside bar pattern detected - consolidation",
            CandlePattern::BullishExtreme => "Strong bullish candle detected",
            CandlePattern::BearishExtreme => "Strong bearish candle detected",
        }
    }
}

/// Result of a pattern scan at the latest bar.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatternScan {
    pub detected: Vec<CandlePattern>,
    /// One explanation line per detected pattern, in detection order.
    pub notes: Vec<&'static str>,
}

impl PatternScan {
    fn push(&mut self, pattern: CandlePattern) {
        self.detected.push(pattern);
        self.notes.push(pattern.description());
    }

    #[inline]
    pub fn contains(&self, pattern: CandlePattern) -> bool {
        self.detected.contains(&pattern)
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.detected.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detected.is_empty()
    }
}

/// Scan the latest bar for doji, inside-bar, and extreme-candle patterns.
///
/// `z_window` is the trailing window (including the latest bar) over which
/// candle bodies are z-scored for the extreme test. Never errors; anything
/// it cannot evaluate simply does not fire.
pub fn detect_patterns(candles: &[Candle], z_window: Period) -> PatternScan {
    let mut scan = PatternScan::default();

    let Some(last) = candles.last() else {
        return scan;
    };

    if is_doji(last) {
        scan.push(CandlePattern::Doji);
    }

    if candles.len() >= 2 {
        let prev = &candles[candles.len() - 2];
        if is_inside_bar(last, prev) {
            scan.push(CandlePattern::InsideBar);
        }
    }

    if let Some(z) = body_z_score(candles, z_window.get()) {
        if z > EXTREME_Z_SCORE {
            scan.push(CandlePattern::BullishExtreme);
        } else if z < -EXTREME_Z_SCORE {
            scan.push(CandlePattern::BearishExtreme);
        }
    }

    scan
}

/// Negligible body relative to the bar's range. A zero body is always a doji.
#[inline]
fn is_doji(candle: &Candle) -> bool {
    let body = candle.body();
    if body <= 0.0 {
        return true;
    }
    let range = candle.range();
    range > 0.0 && body / range <= DOJI_BODY_RATIO
}

/// Current bar's range strictly inside the previous bar's range.
#[inline]
fn is_inside_bar(current: &Candle, previous: &Candle) -> bool {
    current.high < previous.high && current.low > previous.low
}

/// Z-score of the latest signed body against the trailing `window` bodies
/// (sample standard deviation). `None` when the window does not fit or has
/// no variance.
fn body_z_score(candles: &[Candle], window: usize) -> Option<f64> {
    if window < 2 || candles.len() < window {
        return None;
    }

    let bodies: Vec<f64> = candles[candles.len() - window..]
        .iter()
        .map(Candle::signed_body)
        .collect();
    let n = bodies.len() as f64;
    let mean = bodies.iter().sum::<f64>() / n;
    let variance = bodies.iter().map(|b| (b - mean) * (b - mean)).sum::<f64>() / (n - 1.0);
    if variance <= 0.0 {
        return None;
    }

    let last = bodies[bodies.len() - 1];
    Some((last - mean) / variance.sqrt())
}

// ============================================================
// TESTS
// ============================================================
