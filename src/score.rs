//! Composite scoring: interpreted signals in, weighted verdict out.
//!
//! A pure function folds the per-family signals into one sentiment score
//! using fixed point weights, collecting a human-readable line per
//! contributing factor. The score then maps onto discrete sentiment and
//! recommendation buckets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::detect::{CandlePattern, LevelScan, PatternScan};
use crate::interpret::{
    BandCategory, BollingerSignal, CrossoverKind, CrossoverSignal, MacdCategory, MacdSignal,
    RsiCategory, RsiSignal, TrendDirection, TrendSignal, TrendStrength, VolumeCategory,
    VolumeSignal,
};

// ============================================================
// WEIGHTS
// ============================================================

/// Trend points by strength.
const TREND_STRONG_POINTS: i32 = 25;
const TREND_MODERATE_POINTS: i32 = 15;
const TREND_WEAK_POINTS: i32 = 10;
/// A fresh golden or death cross.
const CROSS_POINTS: i32 = 20;
/// Static MA alignment with no fresh cross.
const ALIGNMENT_POINTS: i32 = 10;
/// RSI at an oversold/overbought extreme.
const RSI_EXTREME_POINTS: i32 = 15;
/// RSI leaning bullish/bearish short of an extreme.
const RSI_LEAN_POINTS: i32 = 8;
/// A fresh MACD histogram sign flip.
const MACD_CROSS_POINTS: i32 = 15;
/// MACD leaning bullish/bearish with no fresh flip.
const MACD_LEAN_POINTS: i32 = 8;
/// Close outside a Bollinger band.
const BAND_POINTS: i32 = 10;
/// High volume amplifying the prevailing direction.
const VOLUME_POINTS: i32 = 10;
/// An extreme candle pattern.
const PATTERN_POINTS: i32 = 5;

// ============================================================
// BUCKETS
// ============================================================

/// Qualitative sentiment bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    #[serde(rename = "Very Bullish")]
    VeryBullish,
    #[serde(rename = "Bullish")]
    Bullish,
    #[serde(rename = "Slightly Bullish")]
    SlightlyBullish,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Slightly Bearish")]
    SlightlyBearish,
    #[serde(rename = "Bearish")]
    Bearish,
    #[serde(rename = "Very Bearish")]
    VeryBearish,
}

impl Sentiment {
    pub fn from_score(score: i32) -> Self {
        if score >= 50 {
            Sentiment::VeryBullish
        } else if score >= 30 {
            Sentiment::Bullish
        } else if score >= 10 {
            Sentiment::SlightlyBullish
        } else if score <= -50 {
            Sentiment::VeryBearish
        } else if score <= -30 {
            Sentiment::Bearish
        } else if score <= -10 {
            Sentiment::SlightlyBearish
        } else {
            Sentiment::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::VeryBullish => "Very Bullish",
            Sentiment::Bullish => "Bullish",
            Sentiment::SlightlyBullish => "Slightly Bullish",
            Sentiment::Neutral => "Neutral",
            Sentiment::SlightlyBearish => "Slightly Bearish",
            Sentiment::Bearish => "Bearish",
            Sentiment::VeryBearish => "Very Bearish",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete trading recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "WEAK BUY")]
    WeakBuy,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "WEAK SELL")]
    WeakSell,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "STRONG SELL")]
    StrongSell,
}

impl Recommendation {
    pub fn from_score(score: i32) -> Self {
        if score >= 50 {
            Recommendation::StrongBuy
        } else if score >= 30 {
            Recommendation::Buy
        } else if score >= 10 {
            Recommendation::WeakBuy
        } else if score <= -50 {
            Recommendation::StrongSell
        } else if score <= -30 {
            Recommendation::Sell
        } else if score <= -10 {
            Recommendation::WeakSell
        } else {
            Recommendation::Hold
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "STRONG BUY",
            Recommendation::Buy => "BUY",
            Recommendation::WeakBuy => "WEAK BUY",
            Recommendation::Hold => "HOLD",
            Recommendation::WeakSell => "WEAK SELL",
            Recommendation::Sell => "SELL",
            Recommendation::StrongSell => "STRONG SELL",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================
// SCORING
// ============================================================

/// The interpreted signals feeding one scoring pass.
#[derive(Debug, Clone, Copy)]
pub struct SignalBundle<'a> {
    pub trend: &'a TrendSignal,
    pub crossover: &'a CrossoverSignal,
    pub rsi: &'a RsiSignal,
    pub macd: &'a MacdSignal,
    pub bollinger: &'a BollingerSignal,
    pub volume: &'a VolumeSignal,
    pub patterns: &'a PatternScan,
}

/// Fold the signal bundle into a sentiment score and its contributing lines.
///
/// Factors are evaluated in a fixed order (trend, crossover, RSI, MACD,
/// Bollinger, volume, patterns); a factor reporting insufficient data
/// contributes nothing. High volume is directional only through the score
/// accumulated before it: it amplifies whichever side is already winning
/// (a non-positive running score counts as bearish). A doji contributes a
/// line but no points, and only when no extreme candle fired.
pub fn score_signals(bundle: &SignalBundle<'_>) -> (i32, Vec<&'static str>) {
    let mut score = 0;
    let mut signals = Vec::new();

    match bundle.trend.direction {
        TrendDirection::Bullish => {
            let (points, label) = match bundle.trend.strength {
                TrendStrength::Strong => (TREND_STRONG_POINTS, "Strong bullish trend"),
                TrendStrength::Moderate => (TREND_MODERATE_POINTS, "Moderate bullish trend"),
                TrendStrength::Weak | TrendStrength::Unknown => {
                    (TREND_WEAK_POINTS, "Weak bullish trend")
                }
            };
            score += points;
            signals.push(label);
        }
        TrendDirection::Bearish => {
            let (points, label) = match bundle.trend.strength {
                TrendStrength::Strong => (TREND_STRONG_POINTS, "Strong bearish trend"),
                TrendStrength::Moderate => (TREND_MODERATE_POINTS, "Moderate bearish trend"),
                TrendStrength::Weak | TrendStrength::Unknown => {
                    (TREND_WEAK_POINTS, "Weak bearish trend")
                }
            };
            score -= points;
            signals.push(label);
        }
        TrendDirection::InsufficientData => {}
    }

    match bundle.crossover.kind {
        CrossoverKind::GoldenCross => {
            score += CROSS_POINTS;
            signals.push("Golden Cross detected!");
        }
        CrossoverKind::DeathCross => {
            score -= CROSS_POINTS;
            signals.push("Death Cross detected!");
        }
        CrossoverKind::BullishAlignment => {
            score += ALIGNMENT_POINTS;
            signals.push("Bullish MA alignment");
        }
        CrossoverKind::BearishAlignment => {
            score -= ALIGNMENT_POINTS;
            signals.push("Bearish MA alignment");
        }
        CrossoverKind::Unknown => {}
    }

    match bundle.rsi.category {
        RsiCategory::Oversold => {
            score += RSI_EXTREME_POINTS;
            signals.push("RSI oversold - buy opportunity");
        }
        RsiCategory::Overbought => {
            score -= RSI_EXTREME_POINTS;
            signals.push("RSI overbought - sell signal");
        }
        RsiCategory::Bullish => {
            score += RSI_LEAN_POINTS;
            signals.push("RSI bullish");
        }
        RsiCategory::Bearish => {
            score -= RSI_LEAN_POINTS;
            signals.push("RSI bearish");
        }
        RsiCategory::Neutral | RsiCategory::InsufficientData => {}
    }

    match bundle.macd.category {
        MacdCategory::BullishCrossover => {
            score += MACD_CROSS_POINTS;
            signals.push("MACD bullish crossover");
        }
        MacdCategory::BearishCrossover => {
            score -= MACD_CROSS_POINTS;
            signals.push("MACD bearish crossover");
        }
        MacdCategory::Bullish => {
            score += MACD_LEAN_POINTS;
            signals.push("MACD bullish");
        }
        MacdCategory::Bearish => {
            score -= MACD_LEAN_POINTS;
            signals.push("MACD bearish");
        }
        MacdCategory::Neutral | MacdCategory::InsufficientData => {}
    }

    match bundle.bollinger.category {
        BandCategory::Oversold => {
            score += BAND_POINTS;
            signals.push("Price below lower Bollinger Band");
        }
        BandCategory::Overbought => {
            score -= BAND_POINTS;
            signals.push("Price above upper Bollinger Band");
        }
        _ => {}
    }

    if bundle.volume.category == VolumeCategory::HighVolume {
        if score > 0 {
            score += VOLUME_POINTS;
            signals.push("High volume confirms bullish movement");
        } else {
            score -= VOLUME_POINTS;
            signals.push("High volume confirms bearish movement");
        }
    }

    if bundle.patterns.contains(CandlePattern::BullishExtreme) {
        score += PATTERN_POINTS;
        signals.push("Bullish extreme candle pattern");
    } else if bundle.patterns.contains(CandlePattern::BearishExtreme) {
        score -= PATTERN_POINTS;
        signals.push("Bearish extreme candle pattern");
    } else if bundle.patterns.contains(CandlePattern::Doji) {
        signals.push("Doji pattern - potential reversal");
    }

    (score, signals)
}

// ============================================================
// ANALYSIS RESULT
// ============================================================

/// Every per-family signal record from one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorReport {
    pub trend: TrendSignal,
    pub ma_crossover: CrossoverSignal,
    pub rsi: RsiSignal,
    pub macd: MacdSignal,
    pub bollinger_bands: BollingerSignal,
    pub volume: VolumeSignal,
    pub candlestick_patterns: PatternScan,
    pub support_resistance: LevelScan,
}

/// The externally visible output of an analysis: the composite verdict plus
/// the full indicator report behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub sentiment: Sentiment,
    pub sentiment_score: i32,
    pub recommendation: Recommendation,
    /// Contributing factors in evaluation order.
    pub signals: Vec<&'static str>,
    pub indicators: IndicatorReport,
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral_trend() -> TrendSignal {
        TrendSignal {
            direction: TrendDirection::InsufficientData,
            strength: TrendStrength::Unknown,
            percent_from_anchor: None,
            current_price: 100.0,
            anchor: None,
            explanation: "",
        }
    }

    fn trend(direction: TrendDirection, strength: TrendStrength) -> TrendSignal {
        TrendSignal {
            direction,
            strength,
            percent_from_anchor: Some(0.0),
            current_price: 100.0,
            anchor: Some(100.0),
            explanation: "",
        }
    }

    fn crossover(kind: CrossoverKind) -> CrossoverSignal {
        CrossoverSignal { kind, sma_fast: None, sma_slow: None, explanation: "" }
    }

    fn rsi(category: RsiCategory) -> RsiSignal {
        RsiSignal { value: Some(50.0), category, explanation: "" }
    }

    fn macd(category: MacdCategory) -> MacdSignal {
        MacdSignal {
            value: None,
            signal_line: None,
            histogram: None,
            category,
            explanation: "",
        }
    }

    fn bollinger(category: BandCategory) -> BollingerSignal {
        BollingerSignal {
            lower: None,
            middle: None,
            upper: None,
            position: None,
            current_price: 100.0,
            category,
            explanation: "",
        }
    }

    fn volume(category: VolumeCategory) -> VolumeSignal {
        VolumeSignal {
            current_volume: 0.0,
            volume_ma: None,
            ratio: None,
            category,
            explanation: "",
        }
    }

    fn patterns(detected: &[CandlePattern]) -> PatternScan {
        PatternScan {
            notes: detected.iter().map(CandlePattern::description).collect(),
            detected: detected.to_vec(),
        }
    }

    struct Fixture {
        trend: TrendSignal,
        crossover: CrossoverSignal,
        rsi: RsiSignal,
        macd: MacdSignal,
        bollinger: BollingerSignal,
        volume: VolumeSignal,
        patterns: PatternScan,
    }

    impl Fixture {
        fn quiet() -> Self {
            Self {
                trend: neutral_trend(),
                crossover: crossover(CrossoverKind::Unknown),
                rsi: rsi(RsiCategory::Neutral),
                macd: macd(MacdCategory::Neutral),
                bollinger: bollinger(BandCategory::Neutral),
                volume: volume(VolumeCategory::Normal),
                patterns: patterns(&[]),
            }
        }

        fn bundle(&self) -> SignalBundle<'_> {
            SignalBundle {
                trend: &self.trend,
                crossover: &self.crossover,
                rsi: &self.rsi,
                macd: &self.macd,
                bollinger: &self.bollinger,
                volume: &self.volume,
                patterns: &self.patterns,
            }
        }
    }

    #[test]
    fn test_quiet_bundle_scores_zero() {
        let fixture = Fixture::quiet();
        let (score, signals) = score_signals(&fixture.bundle());
        assert_eq!(score, 0);
        assert!(signals.is_empty());
    }

    #[test]
    fn test_trend_weights() {
        let mut fixture = Fixture::quiet();

        fixture.trend = trend(TrendDirection::Bullish, TrendStrength::Strong);
        assert_eq!(score_signals(&fixture.bundle()).0, 25);

        fixture.trend = trend(TrendDirection::Bullish, TrendStrength::Moderate);
        assert_eq!(score_signals(&fixture.bundle()).0, 15);

        fixture.trend = trend(TrendDirection::Bearish, TrendStrength::Weak);
        assert_eq!(score_signals(&fixture.bundle()).0, -10);
    }

    #[test]
    fn test_crossover_weights() {
        let mut fixture = Fixture::quiet();

        fixture.crossover = crossover(CrossoverKind::GoldenCross);
        let (score, signals) = score_signals(&fixture.bundle());
        assert_eq!(score, 20);
        assert_eq!(signals, vec!["Golden Cross detected!"]);

        fixture.crossover = crossover(CrossoverKind::BearishAlignment);
        assert_eq!(score_signals(&fixture.bundle()).0, -10);
    }

    #[test]
    fn test_oscillator_weights() {
        let mut fixture = Fixture::quiet();
        fixture.rsi = rsi(RsiCategory::Oversold);
        fixture.macd = macd(MacdCategory::BearishCrossover);
        // +15 - 15 = 0.
        assert_eq!(score_signals(&fixture.bundle()).0, 0);

        fixture.rsi = rsi(RsiCategory::Bullish);
        fixture.macd = macd(MacdCategory::Bullish);
        assert_eq!(score_signals(&fixture.bundle()).0, 16);
    }

    #[test]
    fn test_bollinger_weights() {
        let mut fixture = Fixture::quiet();
        fixture.bollinger = bollinger(BandCategory::Oversold);
        assert_eq!(score_signals(&fixture.bundle()).0, 10);

        // Approaching a band is not outside it: no points.
        fixture.bollinger = bollinger(BandCategory::ApproachingUpper);
        assert_eq!(score_signals(&fixture.bundle()).0, 0);
    }

    #[test]
    fn test_high_volume_amplifies_prevailing_direction() {
        let mut fixture = Fixture::quiet();
        fixture.trend = trend(TrendDirection::Bullish, TrendStrength::Strong);
        fixture.volume = volume(VolumeCategory::HighVolume);
        let (score, signals) = score_signals(&fixture.bundle());
        assert_eq!(score, 35);
        assert!(signals.contains(&"High volume confirms bullish movement"));

        fixture.trend = trend(TrendDirection::Bearish, TrendStrength::Strong);
        let (score, signals) = score_signals(&fixture.bundle());
        assert_eq!(score, -35);
        assert!(signals.contains(&"High volume confirms bearish movement"));
    }

    #[test]
    fn test_high_volume_on_zero_score_counts_bearish() {
        let mut fixture = Fixture::quiet();
        fixture.volume = volume(VolumeCategory::HighVolume);
        let (score, signals) = score_signals(&fixture.bundle());
        assert_eq!(score, -10);
        assert_eq!(signals, vec!["High volume confirms bearish movement"]);
    }

    #[test]
    fn test_extreme_pattern_outranks_doji() {
        let mut fixture = Fixture::quiet();
        fixture.patterns = patterns(&[CandlePattern::Doji, CandlePattern::BullishExtreme]);
        let (score, signals) = score_signals(&fixture.bundle());
        assert_eq!(score, 5);
        assert_eq!(signals, vec!["Bullish extreme candle pattern"]);
    }

    #[test]
    fn test_doji_contributes_signal_without_points() {
        let mut fixture = Fixture::quiet();
        fixture.patterns = patterns(&[CandlePattern::Doji]);
        let (score, signals) = score_signals(&fixture.bundle());
        assert_eq!(score, 0);
        assert_eq!(signals, vec!["Doji pattern - potential reversal"]);
    }

    #[test]
    fn test_signals_follow_evaluation_order() {
        let mut fixture = Fixture::quiet();
        fixture.trend = trend(TrendDirection::Bullish, TrendStrength::Strong);
        fixture.crossover = crossover(CrossoverKind::BullishAlignment);
        fixture.rsi = rsi(RsiCategory::Bullish);
        fixture.macd = macd(MacdCategory::Bullish);
        fixture.bollinger = bollinger(BandCategory::Overbought);
        fixture.volume = volume(VolumeCategory::HighVolume);
        fixture.patterns = patterns(&[CandlePattern::Doji]);

        let (score, signals) = score_signals(&fixture.bundle());
        assert_eq!(score, 25 + 10 + 8 + 8 - 10 + 10);
        assert_eq!(
            signals,
            vec![
                "Strong bullish trend",
                "Bullish MA alignment",
                "RSI bullish",
                "MACD bullish",
                "Price above upper Bollinger Band",
                "High volume confirms bullish movement",
                "Doji pattern - potential reversal",
            ]
        );
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let mut fixture = Fixture::quiet();
        fixture.trend = trend(TrendDirection::Bearish, TrendStrength::Moderate);
        fixture.rsi = rsi(RsiCategory::Overbought);
        fixture.volume = volume(VolumeCategory::HighVolume);

        let first = score_signals(&fixture.bundle());
        let second = score_signals(&fixture.bundle());
        assert_eq!(first, second);
        assert_eq!(
            Recommendation::from_score(first.0),
            Recommendation::from_score(second.0)
        );
    }

    #[test]
    fn test_recommendation_buckets() {
        assert_eq!(Recommendation::from_score(55), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_score(50), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_score(49), Recommendation::Buy);
        assert_eq!(Recommendation::from_score(30), Recommendation::Buy);
        assert_eq!(Recommendation::from_score(10), Recommendation::WeakBuy);
        assert_eq!(Recommendation::from_score(9), Recommendation::Hold);
        assert_eq!(Recommendation::from_score(0), Recommendation::Hold);
        assert_eq!(Recommendation::from_score(-9), Recommendation::Hold);
        assert_eq!(Recommendation::from_score(-10), Recommendation::WeakSell);
        assert_eq!(Recommendation::from_score(-30), Recommendation::Sell);
        assert_eq!(Recommendation::from_score(-50), Recommendation::StrongSell);
    }

    #[test]
    fn test_sentiment_mirrors_recommendation_buckets() {
        assert_eq!(Sentiment::from_score(50), Sentiment::VeryBullish);
        assert_eq!(Sentiment::from_score(35), Sentiment::Bullish);
        assert_eq!(Sentiment::from_score(12), Sentiment::SlightlyBullish);
        assert_eq!(Sentiment::from_score(0), Sentiment::Neutral);
        assert_eq!(Sentiment::from_score(-12), Sentiment::SlightlyBearish);
        assert_eq!(Sentiment::from_score(-35), Sentiment::Bearish);
        assert_eq!(Sentiment::from_score(-50), Sentiment::VeryBearish);
    }

    #[test]
    fn test_bucket_labels() {
        assert_eq!(Recommendation::StrongBuy.as_str(), "STRONG BUY");
        assert_eq!(Recommendation::WeakSell.to_string(), "WEAK SELL");
        assert_eq!(Sentiment::VeryBearish.as_str(), "Very Bearish");
    }
}
