//! Interpretation of the latest indicator state into categorical signals.
//!
//! Each function here reads the tail of one indicator family and produces a
//! small signal record: the latest numeric value(s), a closed category, and a
//! human-readable explanation. Thresholds are fixed. An indicator without
//! enough history reports `InsufficientData` instead of guessing.

use serde::{Deserialize, Serialize};

use crate::indicators::{BollingerSeries, IndicatorSeries, MacdSeries};

// ============================================================
// TREND
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Bullish,
    Bearish,
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStrength {
    Strong,
    Moderate,
    Weak,
    Unknown,
}

/// Latest trend state relative to the long (200-period) SMA.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSignal {
    pub direction: TrendDirection,
    pub strength: TrendStrength,
    /// Signed percentage distance from the anchor SMA; negative below it.
    pub percent_from_anchor: Option<f64>,
    pub current_price: f64,
    pub anchor: Option<f64>,
    pub explanation: &'static str,
}

/// Compare the latest close against the latest long-SMA value.
///
/// Strength buckets by percentage distance: > 10% strong, > 5% moderate,
/// otherwise weak. A close exactly on the SMA counts as bearish.
pub fn analyze_trend(current_price: f64, sma_slow: &IndicatorSeries) -> TrendSignal {
    let Some(anchor) = sma_slow.last() else {
        return TrendSignal {
            direction: TrendDirection::InsufficientData,
            strength: TrendStrength::Unknown,
            percent_from_anchor: None,
            current_price,
            anchor: None,
            explanation: "Not enough history for the long moving average",
        };
    };

    if current_price > anchor {
        let percent = (current_price - anchor) / anchor * 100.0;
        TrendSignal {
            direction: TrendDirection::Bullish,
            strength: strength_bucket(percent),
            percent_from_anchor: Some(percent),
            current_price,
            anchor: Some(anchor),
            explanation: "Price above long moving average",
        }
    } else {
        let percent = (anchor - current_price) / anchor * 100.0;
        TrendSignal {
            direction: TrendDirection::Bearish,
            strength: strength_bucket(percent),
            percent_from_anchor: Some(-percent),
            current_price,
            anchor: Some(anchor),
            explanation: "Price below long moving average",
        }
    }
}

fn strength_bucket(percent: f64) -> TrendStrength {
    if percent > 10.0 {
        TrendStrength::Strong
    } else if percent > 5.0 {
        TrendStrength::Moderate
    } else {
        TrendStrength::Weak
    }
}

// ============================================================
// MA CROSSOVER
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverKind {
    GoldenCross,
    DeathCross,
    BullishAlignment,
    BearishAlignment,
    Unknown,
}

/// State of the fast SMA relative to the slow SMA at the last two positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossoverSignal {
    pub kind: CrossoverKind,
    pub sma_fast: Option<f64>,
    pub sma_slow: Option<f64>,
    pub explanation: &'static str,
}

/// Detect a golden/death cross between the fast and slow SMAs.
///
/// A cross requires both SMAs defined at both the current and prior index; a
/// transition from fast-below to fast-above is a golden cross, the reverse a
/// death cross. With no fresh cross, the current static alignment is
/// reported.
pub fn detect_ma_crossover(
    sma_fast: &IndicatorSeries,
    sma_slow: &IndicatorSeries,
) -> CrossoverSignal {
    let (Some((fast_prev, fast_curr)), Some((slow_prev, slow_curr))) =
        (sma_fast.last_two(), sma_slow.last_two())
    else {
        return CrossoverSignal {
            kind: CrossoverKind::Unknown,
            sma_fast: sma_fast.last(),
            sma_slow: sma_slow.last(),
            explanation: "Not enough history for both moving averages",
        };
    };

    let (kind, explanation) = if fast_prev < slow_prev && fast_curr > slow_curr {
        (
            CrossoverKind::GoldenCross,
            "Strong bullish signal - fast SMA crossed above slow SMA",
        )
    } else if fast_prev > slow_prev && fast_curr < slow_curr {
        (
            CrossoverKind::DeathCross,
            "Strong bearish signal - fast SMA crossed below slow SMA",
        )
    } else if fast_curr > slow_curr {
        (
            CrossoverKind::BullishAlignment,
            "Fast SMA above slow SMA (bullish alignment)",
        )
    } else {
        (
            CrossoverKind::BearishAlignment,
            "Fast SMA below slow SMA (bearish alignment)",
        )
    };

    CrossoverSignal {
        kind,
        sma_fast: Some(fast_curr),
        sma_slow: Some(slow_curr),
        explanation,
    }
}

// ============================================================
// RSI
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiCategory {
    Overbought,
    Bullish,
    Oversold,
    Bearish,
    Neutral,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsiSignal {
    pub value: Option<f64>,
    pub category: RsiCategory,
    pub explanation: &'static str,
}

/// Categorize the latest RSI value: >= 70 overbought, >= 60 bullish,
/// <= 30 oversold, <= 40 bearish, otherwise neutral.
pub fn analyze_rsi(rsi: &IndicatorSeries) -> RsiSignal {
    let Some(value) = rsi.last() else {
        return RsiSignal {
            value: None,
            category: RsiCategory::InsufficientData,
            explanation: "Not enough history for RSI",
        };
    };

    let (category, explanation) = if value >= 70.0 {
        (RsiCategory::Overbought, "Potentially overbought - consider selling")
    } else if value >= 60.0 {
        (RsiCategory::Bullish, "Bullish momentum")
    } else if value <= 30.0 {
        (RsiCategory::Oversold, "Potentially oversold - consider buying")
    } else if value <= 40.0 {
        (RsiCategory::Bearish, "Bearish momentum")
    } else {
        (RsiCategory::Neutral, "Neutral zone")
    };

    RsiSignal { value: Some(value), category, explanation }
}

// ============================================================
// MACD
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdCategory {
    Bullish,
    Bearish,
    Neutral,
    BullishCrossover,
    BearishCrossover,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacdSignal {
    pub value: Option<f64>,
    pub signal_line: Option<f64>,
    pub histogram: Option<f64>,
    pub category: MacdCategory,
    pub explanation: &'static str,
}

/// Categorize the latest MACD state.
///
/// Bullish when the MACD line is above the signal line with a positive
/// histogram, bearish in the mirrored case, neutral otherwise. A histogram
/// sign flip between the previous and current position upgrades the category
/// to a fresh crossover.
pub fn analyze_macd(series: &MacdSeries) -> MacdSignal {
    let (Some(value), Some(signal_line), Some(histogram)) =
        (series.macd.last(), series.signal.last(), series.histogram.last())
    else {
        return MacdSignal {
            value: None,
            signal_line: None,
            histogram: None,
            category: MacdCategory::InsufficientData,
            explanation: "Not enough history for MACD",
        };
    };

    let (mut category, mut explanation) = if value > signal_line && histogram > 0.0 {
        (MacdCategory::Bullish, "MACD above signal line - bullish momentum")
    } else if value < signal_line && histogram < 0.0 {
        (MacdCategory::Bearish, "MACD below signal line - bearish momentum")
    } else {
        (MacdCategory::Neutral, "MACD crossing signal line")
    };

    if let Some((prev, curr)) = series.histogram.last_two() {
        if prev < 0.0 && curr > 0.0 {
            category = MacdCategory::BullishCrossover;
            explanation = "MACD crossed above signal line - buy signal";
        } else if prev > 0.0 && curr < 0.0 {
            category = MacdCategory::BearishCrossover;
            explanation = "MACD crossed below signal line - sell signal";
        }
    }

    MacdSignal {
        value: Some(value),
        signal_line: Some(signal_line),
        histogram: Some(histogram),
        category,
        explanation,
    }
}

// ============================================================
// BOLLINGER BANDS
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandCategory {
    Overbought,
    Oversold,
    ApproachingUpper,
    ApproachingLower,
    Neutral,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerSignal {
    pub lower: Option<f64>,
    pub middle: Option<f64>,
    pub upper: Option<f64>,
    /// Position of the close within the bands: 0 at the lower band, 1 at the
    /// upper. 0.5 when the band width is zero.
    pub position: Option<f64>,
    pub current_price: f64,
    pub category: BandCategory,
    pub explanation: &'static str,
}

/// Categorize the latest close against the latest band values.
pub fn analyze_bollinger(current_price: f64, bands: &BollingerSeries) -> BollingerSignal {
    let (Some(lower), Some(middle), Some(upper)) =
        (bands.lower.last(), bands.middle.last(), bands.upper.last())
    else {
        return BollingerSignal {
            lower: None,
            middle: None,
            upper: None,
            position: None,
            current_price,
            category: BandCategory::InsufficientData,
            explanation: "Not enough history for Bollinger Bands",
        };
    };

    let width = upper - lower;
    let position = if width > 0.0 { (current_price - lower) / width } else { 0.5 };

    let (category, explanation) = if current_price > upper {
        (BandCategory::Overbought, "Price above upper band - potentially overbought")
    } else if current_price < lower {
        (BandCategory::Oversold, "Price below lower band - potentially oversold")
    } else if position > 0.7 {
        (BandCategory::ApproachingUpper, "Price approaching upper band")
    } else if position < 0.3 {
        (BandCategory::ApproachingLower, "Price approaching lower band")
    } else {
        (BandCategory::Neutral, "Price within normal range")
    };

    BollingerSignal {
        lower: Some(lower),
        middle: Some(middle),
        upper: Some(upper),
        position: Some(position),
        current_price,
        category,
        explanation,
    }
}

// ============================================================
// VOLUME
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeCategory {
    HighVolume,
    AboveAverage,
    LowVolume,
    BelowAverage,
    Normal,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeSignal {
    pub current_volume: f64,
    pub volume_ma: Option<f64>,
    /// Current volume over its moving average; 1.0 when the average is zero.
    pub ratio: Option<f64>,
    pub category: VolumeCategory,
    pub explanation: &'static str,
}

/// Categorize the latest volume against its moving average.
pub fn analyze_volume(current_volume: f64, volume_ma: &IndicatorSeries) -> VolumeSignal {
    let Some(average) = volume_ma.last() else {
        return VolumeSignal {
            current_volume,
            volume_ma: None,
            ratio: None,
            category: VolumeCategory::InsufficientData,
            explanation: "Not enough history for the volume average",
        };
    };

    let ratio = if average > 0.0 { current_volume / average } else { 1.0 };

    let (category, explanation) = if ratio > 1.5 {
        (VolumeCategory::HighVolume, "Volume significantly above average - strong interest")
    } else if ratio > 1.2 {
        (VolumeCategory::AboveAverage, "Volume above average")
    } else if ratio < 0.5 {
        (VolumeCategory::LowVolume, "Volume significantly below average - low interest")
    } else if ratio < 0.8 {
        (VolumeCategory::BelowAverage, "Volume below average")
    } else {
        (VolumeCategory::Normal, "Volume near average")
    };

    VolumeSignal {
        current_volume,
        volume_ma: Some(average),
        ratio: Some(ratio),
        category,
        explanation,
    }
}

// ============================================================
// TESTS
// ============================================================
