use anyhow::{Result, anyhow};
use statrs::statistics::Statistics;

use crate::smoothing::ema;

/// Least-squares slope of `y` against `x = 0..y.len()`.
fn fit_slope(y: &[f64]) -> f64 {
    let n = y.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = y.mean();

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &yi) in y.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (yi - y_mean);
        den += dx * dx;
    }

    if den == 0.0 { 0.0 } else { num / den }
}

/// Linear-regression endpoint over a sliding window.
///
/// For each index `i >= window - 1`, fits a degree-1 polynomial to the most
/// recent `window` points and evaluates it at the window's last x. This
/// denoises the latest observation instead of taking it raw. Positions
/// before `window - 1` are NaN.
pub fn linreg_endpoint(series: &[f64], window: usize) -> Result<Vec<f64>> {
    if window < 2 {
        return Err(anyhow!("linreg window must be at least 2"));
    }
    if series.len() < window {
        return Err(anyhow!(
            "linreg window {} exceeds series length {}",
            window,
            series.len()
        ));
    }

    let mut out = vec![f64::NAN; window - 1];
    for i in (window - 1)..series.len() {
        let y = &series[i + 1 - window..=i];
        let slope = fit_slope(y);
        // Endpoint of the fitted line: y_mean + slope * ((w-1) - x_mean).
        let endpoint = y.mean() + slope * (window as f64 - 1.0) / 2.0;
        out.push(endpoint);
    }

    Ok(out)
}

/// Least-squares slope of the last `window` points, x = 0..window-1.
pub fn slope_estimate(series: &[f64], window: usize) -> Result<f64> {
    if window < 2 {
        return Err(anyhow!("slope window must be at least 2"));
    }
    if series.len() < window {
        return Err(anyhow!(
            "slope window {} exceeds series length {}",
            window,
            series.len()
        ));
    }

    Ok(fit_slope(&series[series.len() - window..]))
}

/// Standard close-price EMA used for the 7/50/200 trend lines.
pub fn trend_ema(closes: &[f64], span: usize) -> Vec<f64> {
    ema(closes, span)
}
