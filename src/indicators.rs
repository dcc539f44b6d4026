//! Batch indicator computation over a close or volume column.
//!
//! Every function maps an input slice to an [`IndicatorSeries`] of identical
//! length, front-padded with undefined positions until enough history has
//! accumulated. All arithmetic is f64; "undefined" is an explicit `None`, so
//! downstream interpreters branch on a real case instead of probing for NaN.

use serde::{Deserialize, Serialize};

use crate::{Multiplier, Period};

// ============================================================
// INDICATOR SERIES
// ============================================================

/// A derived numeric series aligned position-for-position with its input.
///
/// Positions lacking sufficient history are `None`. Produced by the functions
/// in this module and consumed read-only downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    fn new(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    fn undefined(len: usize) -> Self {
        Self { values: vec![None; len] }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at position `i`, or `None` when out of range or undefined.
    #[inline]
    pub fn get(&self, i: usize) -> Option<f64> {
        self.values.get(i).copied().flatten()
    }

    /// Latest value, or `None` when the series tail is undefined.
    #[inline]
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }

    /// The previous and latest values, both defined, or `None`.
    pub fn last_two(&self) -> Option<(f64, f64)> {
        let n = self.values.len();
        if n < 2 {
            return None;
        }
        Some((self.get(n - 2)?, self.get(n - 1)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values.iter().copied()
    }
}

// ============================================================
// MOVING AVERAGES
// ============================================================

/// Simple moving average: arithmetic mean of the trailing `length` values.
/// Defined from index `length - 1`.
pub fn sma(values: &[f64], length: Period) -> IndicatorSeries {
    let len = length.get();
    let n = values.len();
    let mut out = vec![None; n];

    if n >= len {
        let mut sum: f64 = values[..len].iter().sum();
        out[len - 1] = Some(sum / len as f64);
        for i in len..n {
            sum += values[i] - values[i - len];
            out[i] = Some(sum / len as f64);
        }
    }

    IndicatorSeries::new(out)
}

/// Exponential moving average with smoothing factor `2 / (length + 1)`.
///
/// The first defined value (at index `length - 1`) is seeded with the SMA of
/// the first `length` values; subsequent values follow
/// `ema[i] = value[i] * alpha + ema[i-1] * (1 - alpha)`.
pub fn ema(values: &[f64], length: Period) -> IndicatorSeries {
    let len = length.get();
    let n = values.len();
    if n < len {
        return IndicatorSeries::undefined(n);
    }

    let alpha = 2.0 / (len as f64 + 1.0);
    let mut out = vec![None; n];

    let mut prev: f64 = values[..len].iter().sum::<f64>() / len as f64;
    out[len - 1] = Some(prev);
    for i in len..n {
        prev = values[i] * alpha + prev * (1.0 - alpha);
        out[i] = Some(prev);
    }

    IndicatorSeries::new(out)
}

// ============================================================
// RSI
// ============================================================

/// Relative Strength Index over `length` periods, Wilder smoothing.
///
/// Defined from index `length` (the first `length` price changes seed the
/// averages). When the smoothed average loss is zero the RSI is 100.
pub fn rsi(values: &[f64], length: Period) -> IndicatorSeries {
    let len = length.get();
    let n = values.len();
    if n <= len {
        return IndicatorSeries::undefined(n);
    }

    let period = len as f64;
    let mut out = vec![None; n];

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=len {
        let change = values[i] - values[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period;
    avg_loss /= period;
    out[len] = Some(rsi_value(avg_gain, avg_loss));

    for i in (len + 1)..n {
        let change = values[i] - values[i - 1];
        let (gain, loss) = if change > 0.0 { (change, 0.0) } else { (0.0, -change) };
        avg_gain = (avg_gain * (period - 1.0) + gain) / period;
        avg_loss = (avg_loss * (period - 1.0) + loss) / period;
        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }

    IndicatorSeries::new(out)
}

#[inline]
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

// ============================================================
// MACD
// ============================================================

/// The three aligned series produced by [`macd`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdSeries {
    /// Fast EMA minus slow EMA.
    pub macd: IndicatorSeries,
    /// EMA of the MACD line.
    pub signal: IndicatorSeries,
    /// MACD line minus signal line.
    pub histogram: IndicatorSeries,
}

/// Moving Average Convergence Divergence.
///
/// The MACD line is defined once both underlying EMAs are; the signal line is
/// the `signal`-period EMA of the defined MACD prefix, so it (and the
/// histogram) starts `signal - 1` positions later.
pub fn macd(values: &[f64], fast: Period, slow: Period, signal: Period) -> MacdSeries {
    let n = values.len();
    let ema_fast = ema(values, fast);
    let ema_slow = ema(values, slow);

    let mut line = vec![None; n];
    for i in 0..n {
        if let (Some(f), Some(s)) = (ema_fast.get(i), ema_slow.get(i)) {
            line[i] = Some(f - s);
        }
    }

    let mut signal_line = vec![None; n];
    if let Some(start) = line.iter().position(|v| v.is_some()) {
        // Once both EMAs are defined they stay defined, so the suffix is dense.
        let defined: Vec<f64> = line[start..].iter().flatten().copied().collect();
        for (offset, value) in ema(&defined, signal).iter().enumerate() {
            signal_line[start + offset] = value;
        }
    }

    let mut histogram = vec![None; n];
    for i in 0..n {
        if let (Some(m), Some(s)) = (line[i], signal_line[i]) {
            histogram[i] = Some(m - s);
        }
    }

    MacdSeries {
        macd: IndicatorSeries::new(line),
        signal: IndicatorSeries::new(signal_line),
        histogram: IndicatorSeries::new(histogram),
    }
}

// ============================================================
// BOLLINGER BANDS
// ============================================================

/// The three aligned band series produced by [`bollinger`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerSeries {
    pub middle: IndicatorSeries,
    pub upper: IndicatorSeries,
    pub lower: IndicatorSeries,
}

/// Bollinger Bands: SMA middle band, `mult` population standard deviations
/// either side. All three bands defined from index `length - 1`.
pub fn bollinger(values: &[f64], length: Period, mult: Multiplier) -> BollingerSeries {
    let len = length.get();
    let k = mult.get();
    let n = values.len();

    let mut middle = vec![None; n];
    let mut upper = vec![None; n];
    let mut lower = vec![None; n];

    if n >= len {
        for i in (len - 1)..n {
            let window = &values[i + 1 - len..=i];
            let mean = window.iter().sum::<f64>() / len as f64;
            let variance = window.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / len as f64;
            let dev = k * variance.sqrt();
            middle[i] = Some(mean);
            upper[i] = Some(mean + dev);
            lower[i] = Some(mean - dev);
        }
    }

    BollingerSeries {
        middle: IndicatorSeries::new(middle),
        upper: IndicatorSeries::new(upper),
        lower: IndicatorSeries::new(lower),
    }
}

// ============================================================
// TESTS
// ============================================================
