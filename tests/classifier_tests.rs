// Signal classifier behavior tests: the two reference scenarios plus
// property checks over the decision rules.

use proptest::prelude::*;

use nifty_monitor::classify::{
    CandleColor, CandleStrength, CrossSignal, EmaRelation, HistogramState, IndicatorSnapshot,
    Recommendation, classify,
};

fn snapshot(lin_open: f64, lin_close: f64, histogram: f64) -> IndicatorSnapshot {
    IndicatorSnapshot {
        close: 105.0,
        ema7: 102.0,
        ema50: 110.0,
        ema200: 100.0,
        lin_open,
        lin_close,
        ema7_slope: 0.5,
        ema50_slope: 0.5,
        ema200_slope: 0.3,
        histogram,
    }
}

#[test]
fn test_reference_bullish_scenario() {
    // lin_close=105, lin_open=100, ema7=102, ema50=110, ema200=100,
    // close=105, histogram=15, ema7 slope=0.5.
    let result = classify(&snapshot(100.0, 105.0, 15.0));

    assert_eq!(result.color, CandleColor::Green);
    assert_eq!(result.strength, CandleStrength::VeryStrong);
    assert!((result.strength_pct - 4.7619).abs() < 1e-3);
    assert_eq!(result.ema_relation, EmaRelation::Above);
    assert_eq!(result.cross, CrossSignal::GoldenCross);
    assert_eq!(result.histogram_state, HistogramState::Positive);
    assert!(!result.ema7_sideways);
    assert!(!result.oscillator_sideways);
    assert_eq!(result.recommendation, Recommendation::Buy);
}

#[test]
fn test_reference_scenario_with_sideways_histogram() {
    // Identical inputs but histogram=5, inside the [-10, 10] band: the
    // sideways flag overrides the otherwise fully bullish setup.
    let result = classify(&snapshot(100.0, 105.0, 5.0));

    assert_eq!(result.histogram_state, HistogramState::Positive);
    assert!(result.oscillator_sideways);
    assert_eq!(result.recommendation, Recommendation::Hold);
}

#[test]
fn test_hold_requires_buy_and_sell_to_fail_first() {
    // A strong green candle above EMA7 under a Death Cross with a negative
    // trending histogram: neither entry set holds, nothing is sideways, so
    // the outcome is the wait state rather than HOLD.
    let mut snap = snapshot(100.0, 105.0, -15.0);
    snap.ema50 = 95.0;
    let result = classify(&snap);

    assert_eq!(result.color, CandleColor::Green);
    assert_eq!(result.cross, CrossSignal::DeathCross);
    assert_eq!(result.recommendation, Recommendation::NoClearSignal);
}

proptest! {
    // Candle color is total and mutually exclusive by construction: one of
    // the three variants for every finite input pair.
    #[test]
    fn candle_color_is_total(lin_open in 1.0f64..1e6, lin_close in 1.0f64..1e6) {
        let result = classify(&snapshot(lin_open, lin_close, 15.0));
        match result.color {
            CandleColor::Green => prop_assert!(lin_close > lin_open),
            CandleColor::Red => prop_assert!(lin_close < lin_open),
            CandleColor::Doji => prop_assert!(lin_close == lin_open),
        }
    }

    // BUY requires the bullish side of every gate, SELL the bearish side;
    // the color requirement alone makes them mutually exclusive.
    #[test]
    fn buy_and_sell_are_mutually_exclusive(
        lin_open in 1.0f64..1e6,
        lin_close in 1.0f64..1e6,
        ema7 in 1.0f64..1e6,
        ema50 in 1.0f64..1e6,
        ema200 in 1.0f64..1e6,
        histogram in -100.0f64..100.0,
        ema7_slope in -1.0f64..1.0,
    ) {
        let snap = IndicatorSnapshot {
            close: lin_close.max(1.0),
            ema7,
            ema50,
            ema200,
            lin_open,
            lin_close,
            ema7_slope,
            ema50_slope: 0.5,
            ema200_slope: 0.3,
            histogram,
        };
        let result = classify(&snap);

        match result.recommendation {
            Recommendation::Buy => {
                prop_assert_eq!(result.color, CandleColor::Green);
                prop_assert_eq!(result.cross, CrossSignal::GoldenCross);
                prop_assert!(snap.histogram > 10.0);
                prop_assert!(snap.lin_close > snap.ema7);
            }
            Recommendation::Sell => {
                prop_assert_eq!(result.color, CandleColor::Red);
                prop_assert_eq!(result.cross, CrossSignal::DeathCross);
                prop_assert!(snap.histogram < -10.0);
                prop_assert!(snap.lin_close < snap.ema7);
            }
            Recommendation::Hold => {
                prop_assert!(
                    result.color == CandleColor::Doji
                        || result.ema7_sideways
                        || result.oscillator_sideways
                );
            }
            Recommendation::NoClearSignal => {}
        }
    }

    // Strength bucketing: strong is checked before weak, and the result is
    // consistent with the raw percentage.
    #[test]
    fn strength_bucket_matches_percentage(lin_open in 90.0f64..110.0, lin_close in 90.0f64..110.0) {
        let snap = snapshot(lin_open, lin_close, 15.0);
        let result = classify(&snap);
        let pct = (lin_close - lin_open).abs() / snap.close * 100.0;

        if pct >= 0.5 {
            prop_assert_eq!(result.strength, CandleStrength::VeryStrong);
        } else if pct <= 0.1 {
            prop_assert_eq!(result.strength, CandleStrength::Weak);
        } else {
            prop_assert_eq!(result.strength, CandleStrength::Moderate);
        }
    }
}
