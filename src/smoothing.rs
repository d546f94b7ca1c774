use anyhow::{Result, anyhow};
use statrs::statistics::Statistics;

/// Smoothed moving average (SMMA / RMA).
///
/// The first `length` positions are seeded with the arithmetic mean of the
/// first `length` values; from index `length` onward the recursive form
/// `v[i] = (v[i-1] * (length - 1) + x[i]) / length` applies. Output has the
/// same length as the input.
pub fn smma(series: &[f64], length: usize) -> Result<Vec<f64>> {
    if length == 0 {
        return Err(anyhow!("SMMA length must be positive"));
    }
    if series.len() < length {
        return Err(anyhow!(
            "SMMA length {} exceeds series length {}",
            length,
            series.len()
        ));
    }

    let seed = series[..length].mean();
    let mut out = Vec::with_capacity(series.len());
    out.resize(length, seed);

    for &x in &series[length..] {
        let prev = out[out.len() - 1];
        out.push((prev * (length as f64 - 1.0) + x) / length as f64);
    }

    Ok(out)
}

/// Exponential moving average with smoothing factor `alpha = 2 / (span + 1)`,
/// seeded with the first value. Same length as the input.
pub fn ema(series: &[f64], span: usize) -> Vec<f64> {
    if series.is_empty() || span == 0 {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(series.len());
    out.push(series[0]);

    for &x in &series[1..] {
        let prev = out[out.len() - 1];
        out.push(alpha * x + (1.0 - alpha) * prev);
    }

    out
}

/// Zero-lag EMA: `ema1 + (ema1 - ema2)` where `ema2` is the EMA of `ema1`.
/// The double-smoothed term estimates the lag and extrapolates it away.
pub fn zlema(series: &[f64], span: usize) -> Vec<f64> {
    let ema1 = ema(series, span);
    let ema2 = ema(&ema1, span);

    ema1.iter()
        .zip(ema2.iter())
        .map(|(&e1, &e2)| e1 + (e1 - e2))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smma_seed_and_recurrence() {
        let series = vec![1.0, 2.0, 3.0, 4.0, 10.0];
        let out = smma(&series, 3).unwrap();

        // First three slots hold the seed (mean of 1,2,3).
        assert_eq!(out[0], 2.0);
        assert_eq!(out[1], 2.0);
        assert_eq!(out[2], 2.0);
        // (2*2 + 4) / 3
        assert!((out[3] - 8.0 / 3.0).abs() < 1e-12);
        // (8/3*2 + 10) / 3
        assert!((out[4] - (8.0 / 3.0 * 2.0 + 10.0) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_smma_constant_series_is_constant() {
        let series = vec![5.0; 50];
        let out = smma(&series, 10).unwrap();
        assert!(out.iter().all(|&v| (v - 5.0).abs() < 1e-12));
    }

    #[test]
    fn test_smma_rejects_short_series() {
        assert!(smma(&[1.0, 2.0], 3).is_err());
        assert!(smma(&[1.0, 2.0], 0).is_err());
    }

    #[test]
    fn test_ema_recurrence() {
        let series = vec![10.0, 20.0];
        let out = ema(&series, 3);
        // alpha = 0.5
        assert_eq!(out[0], 10.0);
        assert_eq!(out[1], 15.0);
    }

    #[test]
    fn test_ema_constant_series_is_constant() {
        let series = vec![7.0; 20];
        let out = ema(&series, 7);
        assert!(out.iter().all(|&v| (v - 7.0).abs() < 1e-12));
    }

    #[test]
    fn test_zlema_constant_series_is_constant() {
        let series = vec![3.0; 30];
        let out = zlema(&series, 5);
        assert!(out.iter().all(|&v| (v - 3.0).abs() < 1e-12));
    }

    #[test]
    fn test_zlema_same_length_as_input() {
        let series: Vec<f64> = (0..40).map(|i| i as f64).collect();
        assert_eq!(zlema(&series, 34).len(), series.len());
    }
}
