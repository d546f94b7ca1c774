use std::fmt;

use serde::{Deserialize, Serialize};

/// Latest indicator values for one report invocation. Derived fresh from the
/// current price series each time; never persisted.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub ema7: f64,
    pub ema50: f64,
    pub ema200: f64,
    pub lin_open: f64,
    pub lin_close: f64,
    pub ema7_slope: f64,
    pub ema50_slope: f64,
    pub ema200_slope: f64,
    pub histogram: f64,
}

/// Position of the regression-smoothed close relative to EMA7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmaRelation {
    Above,
    Below,
    At,
}

/// EMA50 vs EMA200 crossover state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossSignal {
    GoldenCross,
    DeathCross,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandleColor {
    Green,
    Red,
    Doji,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandleStrength {
    VeryStrong,
    Moderate,
    Weak,
}

/// EMA50/EMA200 relationship bucket from their slopes and distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmaTrend {
    SidewaysAndClose,
    CloseWithMovement,
    Diverging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistogramState {
    Positive,
    Negative,
    Zero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
    NoClearSignal,
}

/// Categorical labels derived from one snapshot. Immutable once computed.
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    pub ema_relation: EmaRelation,
    pub ema_touching: bool,
    pub cross: CrossSignal,
    pub color: CandleColor,
    pub strength: CandleStrength,
    pub strength_pct: f64,
    pub ema_trend: EmaTrend,
    pub ema7_sideways: bool,
    pub histogram_state: HistogramState,
    pub oscillator_sideways: bool,
    pub recommendation: Recommendation,
}

const STRENGTH_STRONG_PCT: f64 = 0.5;
const STRENGTH_WEAK_PCT: f64 = 0.1;
const SIDEWAYS_SLOPE: f64 = 0.02;
const EMA_DISTANCE_CLOSE_PCT: f64 = 1.0;
const HISTOGRAM_SIDEWAYS_BAND: f64 = 10.0;

/// Map a snapshot to its categorical labels.
///
/// Pure function; all thresholds are fixed. Equality branches (doji candles,
/// exactly-crossed EMAs) are unreachable on real data but encoded explicitly
/// so synthetic inputs classify deterministically.
pub fn classify(snap: &IndicatorSnapshot) -> ClassificationResult {
    let ema_relation = if snap.lin_close > snap.ema7 {
        EmaRelation::Above
    } else if snap.lin_close < snap.ema7 {
        EmaRelation::Below
    } else {
        EmaRelation::At
    };

    let body_lo = snap.lin_open.min(snap.lin_close);
    let body_hi = snap.lin_open.max(snap.lin_close);
    let ema_touching = body_lo <= snap.ema7 && snap.ema7 <= body_hi;

    let cross = if snap.ema50 > snap.ema200 {
        CrossSignal::GoldenCross
    } else if snap.ema50 < snap.ema200 {
        CrossSignal::DeathCross
    } else {
        CrossSignal::Neutral
    };

    let color = if snap.lin_close > snap.lin_open {
        CandleColor::Green
    } else if snap.lin_close < snap.lin_open {
        CandleColor::Red
    } else {
        CandleColor::Doji
    };

    let strength_pct = (snap.lin_close - snap.lin_open).abs() / snap.close * 100.0;
    // Strong is checked before weak: the buckets are not an ordered partition.
    let strength = if strength_pct >= STRENGTH_STRONG_PCT {
        CandleStrength::VeryStrong
    } else if strength_pct <= STRENGTH_WEAK_PCT {
        CandleStrength::Weak
    } else {
        CandleStrength::Moderate
    };

    let ema_distance_pct = (snap.ema50 - snap.ema200).abs() / snap.ema200 * 100.0;
    let ema_trend = if snap.ema50_slope.abs() < SIDEWAYS_SLOPE
        && snap.ema200_slope.abs() < SIDEWAYS_SLOPE
        && ema_distance_pct < EMA_DISTANCE_CLOSE_PCT
    {
        EmaTrend::SidewaysAndClose
    } else if ema_distance_pct < EMA_DISTANCE_CLOSE_PCT {
        EmaTrend::CloseWithMovement
    } else {
        EmaTrend::Diverging
    };

    let ema7_sideways = snap.ema7_slope.abs() < SIDEWAYS_SLOPE;

    let histogram_state = if snap.histogram > 0.0 {
        HistogramState::Positive
    } else if snap.histogram < 0.0 {
        HistogramState::Negative
    } else {
        HistogramState::Zero
    };
    let oscillator_sideways =
        (-HISTOGRAM_SIDEWAYS_BAND..=HISTOGRAM_SIDEWAYS_BAND).contains(&snap.histogram);

    let buy = color == CandleColor::Green
        && strength_pct >= STRENGTH_STRONG_PCT
        && snap.lin_close > snap.ema7
        && cross == CrossSignal::GoldenCross
        && snap.histogram > 0.0
        && !ema7_sideways
        && !oscillator_sideways;

    let sell = color == CandleColor::Red
        && strength_pct >= STRENGTH_STRONG_PCT
        && snap.lin_close < snap.ema7
        && cross == CrossSignal::DeathCross
        && snap.histogram < 0.0
        && !ema7_sideways
        && !oscillator_sideways;

    // HOLD is only reached once both entry condition sets have failed.
    let recommendation = if buy {
        Recommendation::Buy
    } else if sell {
        Recommendation::Sell
    } else if color == CandleColor::Doji || ema7_sideways || oscillator_sideways {
        Recommendation::Hold
    } else {
        Recommendation::NoClearSignal
    };

    ClassificationResult {
        ema_relation,
        ema_touching,
        cross,
        color,
        strength,
        strength_pct,
        ema_trend,
        ema7_sideways,
        histogram_state,
        oscillator_sideways,
        recommendation,
    }
}

impl fmt::Display for CrossSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CrossSignal::GoldenCross => "Golden Cross (Bullish)",
            CrossSignal::DeathCross => "Death Cross (Bearish)",
            CrossSignal::Neutral => "Neutral",
        };
        f.write_str(label)
    }
}

impl fmt::Display for CandleColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CandleColor::Green => "Green (Bullish)",
            CandleColor::Red => "Red (Bearish)",
            CandleColor::Doji => "Doji (Neutral)",
        };
        f.write_str(label)
    }
}

impl fmt::Display for CandleStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CandleStrength::VeryStrong => "Very Strong Candle",
            CandleStrength::Moderate => "Moderate Strength Candle",
            CandleStrength::Weak => "Weak Candle",
        };
        f.write_str(label)
    }
}

impl fmt::Display for EmaTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EmaTrend::SidewaysAndClose => "Sideways and close to each other",
            EmaTrend::CloseWithMovement => "Close to each other but with movement",
            EmaTrend::Diverging => "EMAs showing divergence or trend",
        };
        f.write_str(label)
    }
}

impl fmt::Display for HistogramState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HistogramState::Positive => "Positive",
            HistogramState::Negative => "Negative",
            HistogramState::Zero => "Zero",
        };
        f.write_str(label)
    }
}

impl EmaRelation {
    /// Short label used in the CSV log.
    pub fn log_label(&self) -> &'static str {
        match self {
            EmaRelation::Above => "Above EMA7",
            EmaRelation::Below => "Below EMA7",
            EmaRelation::At => "At EMA7",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullish_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            close: 105.0,
            ema7: 102.0,
            ema50: 110.0,
            ema200: 100.0,
            lin_open: 100.0,
            lin_close: 105.0,
            ema7_slope: 0.5,
            ema50_slope: 0.5,
            ema200_slope: 0.3,
            histogram: 15.0,
        }
    }

    #[test]
    fn test_bullish_scenario_recommends_buy() {
        let result = classify(&bullish_snapshot());
        assert_eq!(result.color, CandleColor::Green);
        assert_eq!(result.strength, CandleStrength::VeryStrong);
        assert!((result.strength_pct - 5.0 / 105.0 * 100.0).abs() < 1e-9);
        assert_eq!(result.ema_relation, EmaRelation::Above);
        assert_eq!(result.cross, CrossSignal::GoldenCross);
        assert_eq!(result.histogram_state, HistogramState::Positive);
        assert!(!result.oscillator_sideways);
        assert_eq!(result.recommendation, Recommendation::Buy);
    }

    #[test]
    fn test_sideways_histogram_forces_hold() {
        // Same bullish setup, but the histogram sits inside the [-10, 10]
        // band, so the market counts as sideways.
        let mut snap = bullish_snapshot();
        snap.histogram = 5.0;
        let result = classify(&snap);
        assert!(result.oscillator_sideways);
        assert_eq!(result.recommendation, Recommendation::Hold);
    }

    #[test]
    fn test_bearish_scenario_recommends_sell() {
        let snap = IndicatorSnapshot {
            close: 95.0,
            ema7: 98.0,
            ema50: 90.0,
            ema200: 100.0,
            lin_open: 100.0,
            lin_close: 95.0,
            ema7_slope: -0.5,
            ema50_slope: -0.5,
            ema200_slope: -0.3,
            histogram: -15.0,
        };
        let result = classify(&snap);
        assert_eq!(result.color, CandleColor::Red);
        assert_eq!(result.cross, CrossSignal::DeathCross);
        assert_eq!(result.recommendation, Recommendation::Sell);
    }

    #[test]
    fn test_doji_holds() {
        let mut snap = bullish_snapshot();
        snap.lin_open = 105.0;
        snap.lin_close = 105.0;
        let result = classify(&snap);
        assert_eq!(result.color, CandleColor::Doji);
        assert_eq!(result.strength, CandleStrength::Weak);
        assert_eq!(result.recommendation, Recommendation::Hold);
    }

    #[test]
    fn test_equal_emas_are_neutral() {
        let mut snap = bullish_snapshot();
        snap.ema50 = 100.0;
        snap.ema200 = 100.0;
        let result = classify(&snap);
        assert_eq!(result.cross, CrossSignal::Neutral);
        assert_ne!(result.recommendation, Recommendation::Buy);
    }

    #[test]
    fn test_strength_buckets() {
        let mut snap = bullish_snapshot();

        // 0.6% body
        snap.lin_open = 100.0;
        snap.lin_close = 100.63;
        snap.close = 105.0;
        assert_eq!(classify(&snap).strength, CandleStrength::VeryStrong);

        // 0.05% body
        snap.lin_close = 100.0525;
        assert_eq!(classify(&snap).strength, CandleStrength::Weak);

        // 0.3% body
        snap.lin_close = 100.315;
        assert_eq!(classify(&snap).strength, CandleStrength::Moderate);
    }

    #[test]
    fn test_ema_trend_buckets() {
        let mut snap = bullish_snapshot();

        snap.ema50 = 100.1;
        snap.ema200 = 100.0;
        snap.ema50_slope = 0.001;
        snap.ema200_slope = 0.001;
        assert_eq!(classify(&snap).ema_trend, EmaTrend::SidewaysAndClose);

        snap.ema50_slope = 0.5;
        assert_eq!(classify(&snap).ema_trend, EmaTrend::CloseWithMovement);

        snap.ema50 = 110.0;
        assert_eq!(classify(&snap).ema_trend, EmaTrend::Diverging);
    }

    #[test]
    fn test_ema_touching_candle_body() {
        let mut snap = bullish_snapshot();
        snap.lin_open = 100.0;
        snap.lin_close = 105.0;

        snap.ema7 = 102.0;
        assert!(classify(&snap).ema_touching);

        snap.ema7 = 99.0;
        assert!(!classify(&snap).ema_touching);

        // Boundary counts as touching.
        snap.ema7 = 100.0;
        assert!(classify(&snap).ema_touching);
    }

    #[test]
    fn test_flat_ema7_slope_is_sideways() {
        let mut snap = bullish_snapshot();
        snap.ema7_slope = 0.01;
        let result = classify(&snap);
        assert!(result.ema7_sideways);
        assert_eq!(result.recommendation, Recommendation::Hold);
    }
}
