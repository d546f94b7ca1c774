use anyhow::{Context, Result, anyhow};
use log::debug;

use crate::market_data::PriceSeries;
use crate::smoothing::{smma, zlema};

pub const DEFAULT_LENGTH_MA: usize = 34;
pub const DEFAULT_LENGTH_SIGNAL: usize = 9;

/// Impulse MACD output: three aligned series, same length as the input bars.
///
/// The signal line is a rolling mean and is NaN for the first
/// `length_signal - 1` positions; the histogram inherits those NaNs.
#[derive(Debug, Clone)]
pub struct ImpulseMacd {
    pub momentum: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl ImpulseMacd {
    /// Latest histogram value, if the series was long enough to produce one.
    pub fn latest_histogram(&self) -> Option<f64> {
        self.histogram.last().copied().filter(|v| !v.is_nan())
    }
}

/// Impulse MACD over OHLC bars.
///
/// Compares a zero-lag EMA of the typical price against SMMA bands of the
/// highs and lows: momentum is the distance outside the band (positive above,
/// negative below) and zero inside it. Exactly one branch applies per bar.
pub fn impulse_macd(
    series: &PriceSeries,
    length_ma: usize,
    length_signal: usize,
) -> Result<ImpulseMacd> {
    if length_signal == 0 {
        return Err(anyhow!("signal length must be positive"));
    }
    if series.len() < length_ma {
        return Err(anyhow!(
            "impulse MACD needs at least {} bars, got {}",
            length_ma,
            series.len()
        ));
    }

    let highs = series.highs();
    let lows = series.lows();
    let typical = series.typical_prices();

    let hi = smma(&highs, length_ma).context("SMMA of highs failed")?;
    let lo = smma(&lows, length_ma).context("SMMA of lows failed")?;
    let mid = zlema(&typical, length_ma);

    let momentum: Vec<f64> = mid
        .iter()
        .zip(hi.iter().zip(lo.iter()))
        .map(|(&m, (&h, &l))| {
            if m > h {
                m - h
            } else if m < l {
                m - l
            } else {
                0.0
            }
        })
        .collect();

    let signal = rolling_mean(&momentum, length_signal);
    let histogram: Vec<f64> = momentum
        .iter()
        .zip(signal.iter())
        .map(|(&m, &s)| m - s)
        .collect();

    debug!(
        "impulse MACD over {} bars: latest momentum {:.4}, histogram {:.4}",
        series.len(),
        momentum.last().copied().unwrap_or(f64::NAN),
        histogram.last().copied().unwrap_or(f64::NAN)
    );

    Ok(ImpulseMacd {
        momentum,
        signal,
        histogram,
    })
}

/// Rolling arithmetic mean; NaN for the first `window - 1` positions.
fn rolling_mean(series: &[f64], window: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(series.len());
    let mut sum = 0.0;

    for (i, &x) in series.iter().enumerate() {
        sum += x;
        if i + 1 < window {
            out.push(f64::NAN);
        } else {
            if i + 1 > window {
                sum -= series[i - window];
            }
            out.push(sum / window as f64);
        }
    }

    out
}
