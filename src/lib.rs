//! # ta-verdict - Technical Indicator & Composite Signal Engine
//!
//! Turns a historical OHLCV series into a structured technical-analysis
//! verdict: trend state, oscillator readings, volatility bands, volume
//! context, candlestick-pattern flags, support/resistance levels, and a
//! single weighted sentiment score mapped to a discrete recommendation.
//!
//! The engine is pure computation: no I/O, no printing, no state across
//! calls. Fetching market data and presenting results belong to callers.
//!
//! ## Quick Start
//!
//! ```rust
//! use ta_verdict::prelude::*;
//!
//! // Raw OHLC rows: [timestamp_ms, open, high, low, close]
//! let ohlc: Vec<[f64; 5]> = (0..250)
//!     .map(|i| {
//!         let t = (i as f64) * 86_400_000.0;
//!         let p = 100.0 + i as f64;
//!         [t, p, p + 1.0, p - 1.0, p + 0.5]
//!     })
//!     .collect();
//!
//! let series = Series::from_rows(&ohlc, None).unwrap();
//! let verdict = Analyzer::default().analyze(&series).unwrap();
//! println!("{} (score {})", verdict.recommendation, verdict.sentiment_score);
//! ```

pub mod detect;
pub mod indicators;
pub mod interpret;
pub mod score;
pub mod series;

pub mod prelude {
    pub use crate::{
        // Detection
        detect::{
            detect_patterns, identify_support_resistance, CandlePattern, LevelScan, PatternScan,
        },
        // Indicators
        indicators::{
            bollinger, ema, macd, rsi, sma, BollingerSeries, IndicatorSeries, MacdSeries,
        },
        // Interpretation
        interpret::{
            analyze_bollinger, analyze_macd, analyze_rsi, analyze_trend, analyze_volume,
            detect_ma_crossover, BandCategory, BollingerSignal, CrossoverKind, CrossoverSignal,
            MacdCategory, MacdSignal, RsiCategory, RsiSignal, TrendDirection, TrendSignal,
            TrendStrength, VolumeCategory, VolumeSignal,
        },
        // Scoring
        score::{
            score_signals, AnalysisResult, IndicatorReport, Recommendation, Sentiment,
            SignalBundle,
        },
        // Series
        series::{Candle, Series},
        // Parallel
        analyze_parallel,
        // Engine
        AnalysisError,
        Analyzer,
        AnalyzerBuilder,
        Multiplier,
        Period,
        Result,
        SymbolAnalysis,
        SymbolError,
    };
}

use crate::detect::{detect_patterns, identify_support_resistance};
use crate::indicators::{bollinger, macd, rsi, sma};
use crate::interpret::{
    analyze_bollinger, analyze_macd, analyze_rsi, analyze_trend, analyze_volume,
    detect_ma_crossover,
};
use crate::score::{
    score_signals, AnalysisResult, IndicatorReport, Recommendation, Sentiment, SignalBundle,
};
use crate::series::Series;

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur while building a series or running an analysis.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("Invalid config: {0}")]
    InvalidConfig(&'static str),

    #[error("Insufficient data: need {need} rows, got {got}")]
    InsufficientData { need: usize, got: usize },

    #[error("Malformed input at row {index}: {reason}")]
    MalformedInput { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Window length (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating the value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(AnalysisError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    /// Create a Period from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

/// Positive finite multiplier, e.g. the Bollinger standard-deviation multiple
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Multiplier(f64);

impl Multiplier {
    /// Create a new Multiplier, validating the value is finite and > 0
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(AnalysisError::InvalidValue(
                "Multiplier cannot be NaN or infinite",
            ));
        }
        if value <= 0.0 {
            return Err(AnalysisError::InvalidValue("Multiplier must be > 0"));
        }
        Ok(Self(value))
    }

    /// Create a Multiplier from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Multiplier {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Multiplier {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Multiplier::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// ANALYZER
// ============================================================

/// Fewest OHLC rows any analysis will accept; below this the shortest
/// indicator window cannot produce a single defined value.
pub const MIN_ROWS: usize = 20;

/// Window and threshold configuration for one analyzer.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalyzerConfig {
    /// Fast SMA for crossovers and dynamic support.
    pub sma_fast: Period,
    /// Slow SMA anchoring the trend and dynamic resistance.
    pub sma_slow: Period,
    pub rsi_length: Period,
    pub macd_fast: Period,
    pub macd_slow: Period,
    pub macd_signal: Period,
    pub bollinger_length: Period,
    pub bollinger_mult: Multiplier,
    pub volume_ma_length: Period,
    /// Half-width of the pivot neighborhood for support/resistance.
    pub pivot_window: Period,
    /// Trailing window for the extreme-candle z-score.
    pub z_window: Period,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sma_fast: Period::new_const(50),
            sma_slow: Period::new_const(200),
            rsi_length: Period::new_const(14),
            macd_fast: Period::new_const(12),
            macd_slow: Period::new_const(26),
            macd_signal: Period::new_const(9),
            bollinger_length: Period::new_const(20),
            bollinger_mult: Multiplier::new_const(2.0),
            volume_ma_length: Period::new_const(20),
            pivot_window: Period::new_const(10),
            z_window: Period::new_const(30),
        }
    }
}

/// The composite signal engine.
///
/// Stateless and referentially transparent: the same series always yields
/// the same [`AnalysisResult`], so one analyzer can serve any number of
/// concurrent analyses without synchronization.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self { config: AnalyzerConfig::default() }
    }
}

impl Analyzer {
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Run the full pipeline over a series.
    ///
    /// Partial indicator insufficiency is not an error: each family reports
    /// `insufficient_data` for itself and contributes nothing to the score.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::InsufficientData`] when the series has fewer than
    /// [`MIN_ROWS`] rows.
    pub fn analyze(&self, series: &Series) -> Result<AnalysisResult> {
        let got = series.len();
        if got < MIN_ROWS {
            return Err(AnalysisError::InsufficientData { need: MIN_ROWS, got });
        }

        let cfg = &self.config;
        let closes = series.closes();
        let volumes = series.volumes();
        let last_close = closes[closes.len() - 1];
        let last_volume = volumes[volumes.len() - 1];

        let sma_fast = sma(&closes, cfg.sma_fast);
        let sma_slow = sma(&closes, cfg.sma_slow);
        let rsi_series = rsi(&closes, cfg.rsi_length);
        let macd_series = macd(&closes, cfg.macd_fast, cfg.macd_slow, cfg.macd_signal);
        let bands = bollinger(&closes, cfg.bollinger_length, cfg.bollinger_mult);
        let volume_ma = sma(&volumes, cfg.volume_ma_length);

        let trend = analyze_trend(last_close, &sma_slow);
        let ma_crossover = detect_ma_crossover(&sma_fast, &sma_slow);
        let rsi_signal = analyze_rsi(&rsi_series);
        let macd_signal = analyze_macd(&macd_series);
        let bollinger_signal = analyze_bollinger(last_close, &bands);
        let volume_signal = analyze_volume(last_volume, &volume_ma);
        let patterns = detect_patterns(series.candles(), cfg.z_window);
        let support_resistance =
            identify_support_resistance(series.candles(), cfg.pivot_window, &sma_fast, &sma_slow);

        let (sentiment_score, signals) = score_signals(&SignalBundle {
            trend: &trend,
            crossover: &ma_crossover,
            rsi: &rsi_signal,
            macd: &macd_signal,
            bollinger: &bollinger_signal,
            volume: &volume_signal,
            patterns: &patterns,
        });

        Ok(AnalysisResult {
            sentiment: Sentiment::from_score(sentiment_score),
            sentiment_score,
            recommendation: Recommendation::from_score(sentiment_score),
            signals,
            indicators: IndicatorReport {
                trend,
                ma_crossover,
                rsi: rsi_signal,
                macd: macd_signal,
                bollinger_bands: bollinger_signal,
                volume: volume_signal,
                candlestick_patterns: patterns,
                support_resistance,
            },
        })
    }

    /// Build a series from raw rows and analyze it in one step.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::MalformedInput`] from the builder, or
    /// [`AnalysisError::InsufficientData`] from the row floor.
    pub fn analyze_rows(
        &self,
        ohlc: &[[f64; 5]],
        volume: Option<&[[f64; 2]]>,
    ) -> Result<AnalysisResult> {
        let series = Series::from_rows(ohlc, volume)?;
        self.analyze(&series)
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for [`Analyzer`] instances with non-default windows.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sma_fast(mut self, period: Period) -> Self {
        self.config.sma_fast = period;
        self
    }

    pub fn sma_slow(mut self, period: Period) -> Self {
        self.config.sma_slow = period;
        self
    }

    pub fn rsi_length(mut self, period: Period) -> Self {
        self.config.rsi_length = period;
        self
    }

    pub fn macd(mut self, fast: Period, slow: Period, signal: Period) -> Self {
        self.config.macd_fast = fast;
        self.config.macd_slow = slow;
        self.config.macd_signal = signal;
        self
    }

    pub fn bollinger(mut self, length: Period, mult: Multiplier) -> Self {
        self.config.bollinger_length = length;
        self.config.bollinger_mult = mult;
        self
    }

    pub fn volume_ma_length(mut self, period: Period) -> Self {
        self.config.volume_ma_length = period;
        self
    }

    pub fn pivot_window(mut self, period: Period) -> Self {
        self.config.pivot_window = period;
        self
    }

    pub fn z_window(mut self, period: Period) -> Self {
        self.config.z_window = period;
        self
    }

    /// Build the analyzer, validating cross-field constraints.
    pub fn build(self) -> Result<Analyzer> {
        if self.config.macd_fast >= self.config.macd_slow {
            return Err(AnalysisError::InvalidConfig(
                "MACD fast period must be shorter than the slow period",
            ));
        }
        if self.config.sma_fast >= self.config.sma_slow {
            return Err(AnalysisError::InvalidConfig(
                "fast SMA period must be shorter than the slow period",
            ));
        }
        Ok(Analyzer { config: self.config })
    }
}

// ============================================================
// PARALLEL ANALYSIS
// ============================================================

use rayon::prelude::*;

/// Successful analysis of a single instrument
#[derive(Debug)]
pub struct SymbolAnalysis {
    pub symbol: String,
    pub analysis: AnalysisResult,
}

/// Failed analysis of a single instrument
#[derive(Debug)]
pub struct SymbolError {
    pub symbol: String,
    pub error: AnalysisError,
}

/// Analyze many instruments concurrently with one analyzer.
///
/// The engine itself is single-threaded per call; this simply fans
/// independent analyses across a thread pool, which is safe because every
/// analysis is a pure function of its series.
pub fn analyze_parallel<'a, I>(
    analyzer: &Analyzer,
    instruments: I,
) -> (Vec<SymbolAnalysis>, Vec<SymbolError>)
where
    I: IntoParallelIterator<Item = (&'a str, &'a Series)>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, series)| {
            analyzer
                .analyze(series)
                .map(|analysis| SymbolAnalysis {
                    symbol: symbol.to_string(),
                    analysis,
                })
                .map_err(|error| SymbolError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::{TrendDirection, TrendStrength};

    fn uptrend_rows(n: usize) -> Vec<[f64; 5]> {
        (0..n)
            .map(|i| {
                let t = (i as f64) * 60_000.0;
                let p = 100.0 + i as f64;
                [t, p, p + 1.0, p - 1.0, p + 0.5]
            })
            .collect()
    }

    #[test]
    fn test_period_validation() {
        assert!(Period::new(1).is_ok());
        assert!(Period::new(200).is_ok());
        assert!(Period::new(0).is_err());
    }

    #[test]
    fn test_multiplier_validation() {
        assert!(Multiplier::new(2.0).is_ok());
        assert!(Multiplier::new(0.5).is_ok());
        assert!(Multiplier::new(0.0).is_err());
        assert!(Multiplier::new(-1.0).is_err());
        assert!(Multiplier::new(f64::NAN).is_err());
        assert!(Multiplier::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_builder_rejects_inverted_macd_periods() {
        let result = Analyzer::builder()
            .macd(
                Period::new_const(26),
                Period::new_const(12),
                Period::new_const(9),
            )
            .build();
        assert!(matches!(result, Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_rejects_inverted_sma_periods() {
        let result = Analyzer::builder()
            .sma_fast(Period::new_const(200))
            .sma_slow(Period::new_const(50))
            .build();
        assert!(matches!(result, Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_defaults() {
        let analyzer = Analyzer::builder().build().unwrap();
        assert_eq!(analyzer.config().sma_slow.get(), 200);
        assert_eq!(analyzer.config().bollinger_mult.get(), 2.0);
    }

    #[test]
    fn test_row_floor_boundary() {
        let analyzer = Analyzer::default();

        let short = Series::from_rows(&uptrend_rows(19), None).unwrap();
        let err = analyzer.analyze(&short).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData { need: MIN_ROWS, got: 19 }
        ));

        let enough = Series::from_rows(&uptrend_rows(20), None).unwrap();
        assert!(analyzer.analyze(&enough).is_ok());
    }

    #[test]
    fn test_partial_history_degrades_instead_of_failing() {
        // 20 rows: Bollinger and volume MA are defined, SMA200 and MACD not.
        let series = Series::from_rows(&uptrend_rows(20), None).unwrap();
        let result = Analyzer::default().analyze(&series).unwrap();
        assert_eq!(
            result.indicators.trend.direction,
            TrendDirection::InsufficientData
        );
        assert!(result.indicators.bollinger_bands.middle.is_some());
    }

    #[test]
    fn test_long_uptrend_is_strongly_bullish() {
        let series = Series::from_rows(&uptrend_rows(250), None).unwrap();
        let result = Analyzer::default().analyze(&series).unwrap();
        assert_eq!(result.indicators.trend.direction, TrendDirection::Bullish);
        assert_eq!(result.indicators.trend.strength, TrendStrength::Strong);
        assert!(result.sentiment_score > 0);
    }

    #[test]
    fn test_analyze_rows_convenience() {
        let result = Analyzer::default().analyze_rows(&uptrend_rows(60), None);
        assert!(result.is_ok());
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let series = Series::from_rows(&uptrend_rows(250), None).unwrap();
        let analyzer = Analyzer::default();
        let first = analyzer.analyze(&series).unwrap();
        let second = analyzer.analyze(&series).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parallel_analysis() {
        let long = Series::from_rows(&uptrend_rows(250), None).unwrap();
        let short = Series::from_rows(&uptrend_rows(5), None).unwrap();
        let analyzer = Analyzer::default();

        let instruments: Vec<(&str, &Series)> = vec![("BTC", &long), ("DUST", &short)];
        let (successes, errors) = analyze_parallel(&analyzer, instruments);

        assert_eq!(successes.len(), 1);
        assert_eq!(successes[0].symbol, "BTC");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].symbol, "DUST");
        assert!(matches!(
            errors[0].error,
            AnalysisError::InsufficientData { .. }
        ));
    }
}
