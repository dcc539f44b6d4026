//! Canonical OHLCV series construction.
//!
//! Raw market data arrives as two parallel feeds: OHLC rows
//! `[timestamp_ms, open, high, low, close]` and an optional, separately
//! sourced volume feed `[timestamp_ms, volume]`. This module normalizes both
//! into one time-ordered [`Series`] of [`Candle`]s, merging volume onto each
//! candle by nearest-timestamp matching.

use serde::{Deserialize, Serialize};

use crate::{AnalysisError, Result};

// ============================================================
// CANDLE
// ============================================================

/// One interval of trading activity.
///
/// Invariant (assumed from the data provider, not enforced here):
/// `low <= min(open, close) <= max(open, close) <= high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Epoch milliseconds, strictly increasing within a series.
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Absolute body size.
    #[inline]
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Body with direction: positive for a bullish candle.
    #[inline]
    pub fn signed_body(&self) -> f64 {
        self.close - self.open
    }

    /// High-to-low extent.
    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    #[inline]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    #[inline]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

// ============================================================
// SERIES
// ============================================================

/// Immutable, time-ordered sequence of candles.
///
/// Built once from raw rows via [`Series::from_rows`]; indicator computation
/// derives new aligned series from it and never mutates the base data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    candles: Vec<Candle>,
}

impl Series {
    /// Build a series from raw OHLC rows and an optional volume feed.
    ///
    /// Each OHLC row is `[timestamp_ms, open, high, low, close]`; each volume
    /// row is `[timestamp_ms, volume]`. Volume is matched to each candle by
    /// exact timestamp where possible, otherwise by the numerically closest
    /// volume timestamp (ties go to the earlier one). Candles outside the
    /// volume feed's covered range take the boundary value. With no volume
    /// feed at all, every candle gets volume 0.
    ///
    /// Empty and short inputs build fine; minimum-length requirements belong
    /// to the analysis entry point, not the builder.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::MalformedInput`] on non-finite fields or
    /// non-strictly-increasing timestamps.
    pub fn from_rows(ohlc: &[[f64; 5]], volume: Option<&[[f64; 2]]>) -> Result<Self> {
        let volume_index = volume.map(VolumeIndex::new).transpose()?;

        let mut candles = Vec::with_capacity(ohlc.len());
        let mut prev_ts: Option<i64> = None;

        for (index, row) in ohlc.iter().enumerate() {
            if row.iter().any(|v| !v.is_finite()) {
                return Err(AnalysisError::MalformedInput {
                    index,
                    reason: "non-finite value in OHLC row",
                });
            }

            let timestamp_ms = row[0] as i64;
            if let Some(prev) = prev_ts {
                if timestamp_ms <= prev {
                    return Err(AnalysisError::MalformedInput {
                        index,
                        reason: "timestamps must be strictly increasing",
                    });
                }
            }
            prev_ts = Some(timestamp_ms);

            let volume = match &volume_index {
                Some(idx) => idx.nearest(timestamp_ms),
                None => 0.0,
            };

            candles.push(Candle {
                timestamp_ms,
                open: row[1],
                high: row[2],
                low: row[3],
                close: row[4],
                volume,
            });
        }

        Ok(Self { candles })
    }

    /// Build directly from candles already carrying volume.
    pub fn from_candles(candles: Vec<Candle>) -> Result<Self> {
        for (index, pair) in candles.windows(2).enumerate() {
            if pair[1].timestamp_ms <= pair[0].timestamp_ms {
                return Err(AnalysisError::MalformedInput {
                    index: index + 1,
                    reason: "timestamps must be strictly increasing",
                });
            }
        }
        Ok(Self { candles })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    #[inline]
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    #[inline]
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Close column, in series order.
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Volume column, in series order.
    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }
}

// ============================================================
// VOLUME MERGE
// ============================================================

/// Sorted volume feed supporting O(log m) nearest-timestamp lookup.
struct VolumeIndex {
    /// (timestamp_ms, volume), ascending by timestamp.
    entries: Vec<(i64, f64)>,
}

impl VolumeIndex {
    fn new(rows: &[[f64; 2]]) -> Result<Self> {
        let mut entries = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.iter().any(|v| !v.is_finite()) {
                return Err(AnalysisError::MalformedInput {
                    index,
                    reason: "non-finite value in volume row",
                });
            }
            entries.push((row[0] as i64, row[1]));
        }
        entries.sort_by_key(|&(ts, _)| ts);
        Ok(Self { entries })
    }

    /// Volume at the timestamp closest to `ts`.
    ///
    /// Exact matches win. Between two bracketing timestamps the numerically
    /// closer one is taken; when both are equidistant the earlier timestamp
    /// wins. This tie-break is observable behavior, not an accident - see the
    /// merge tests. Outside the covered range the boundary entry applies.
    /// An empty feed yields 0.
    fn nearest(&self, ts: i64) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }

        match self.entries.binary_search_by_key(&ts, |&(t, _)| t) {
            Ok(i) => self.entries[i].1,
            Err(0) => self.entries[0].1,
            Err(i) if i == self.entries.len() => self.entries[i - 1].1,
            Err(i) => {
                let (before_ts, before_vol) = self.entries[i - 1];
                let (after_ts, after_vol) = self.entries[i];
                if ts - before_ts <= after_ts - ts {
                    before_vol
                } else {
                    after_vol
                }
            }
        }
    }
}

// ============================================================
// TESTS
// ============================================================
