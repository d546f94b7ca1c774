use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, TimeZone, Utc};
use log::{debug, info, warn};
use serde::Deserialize;

/// One OHLC sample for a fixed interval. Immutable once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Chronological sequence of bars for one symbol. Bars with any missing
/// field are dropped at construction time, not interpolated.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// `(high + low + close) / 3` per bar.
    pub fn typical_prices(&self) -> Vec<f64> {
        self.bars
            .iter()
            .map(|b| (b.high + b.low + b.close) / 3.0)
            .collect()
    }
}

// Yahoo Finance v8 chart API response envelope. Quote columns use nulls for
// missing samples, hence the nested Options.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// HTTP client for the Yahoo Finance chart endpoint.
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: "https://query1.finance.yahoo.com".to_string(),
        }
    }

    /// Client pointed at a different host, used by tests and proxies.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch OHLC bars for `symbol` over a trailing `range` at `interval`
    /// granularity (e.g. "7d" / "5m"). Incomplete bars are dropped.
    pub async fn fetch_bars(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<PriceSeries> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        debug!(
            "fetching {} bars: range={} interval={}",
            symbol, range, interval
        );

        let response = self
            .client
            .get(&url)
            .query(&[("range", range), ("interval", interval)])
            .header("User-Agent", "nifty-monitor/0.1")
            .send()
            .await
            .with_context(|| format!("market data request for {} failed", symbol))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!(
                "market data provider returned HTTP {} for {}",
                status,
                symbol
            ));
        }

        let payload: ChartResponse = response
            .json()
            .await
            .with_context(|| format!("invalid market data payload for {}", symbol))?;

        if let Some(err) = payload.chart.error {
            return Err(anyhow!(
                "market data provider error for {}: {} ({})",
                symbol,
                err.description,
                err.code
            ));
        }

        let result = payload
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| anyhow!("empty chart result for {}", symbol))?;

        let series = Self::to_series(result)?;
        if series.is_empty() {
            return Err(anyhow!("no complete bars returned for {}", symbol));
        }

        info!("fetched {} complete bars for {}", series.len(), symbol);
        Ok(series)
    }

    fn to_series(result: ChartResult) -> Result<PriceSeries> {
        let timestamps = result
            .timestamp
            .ok_or_else(|| anyhow!("chart result has no timestamps"))?;
        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("chart result has no quote block"))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        let mut dropped = 0usize;

        for (i, &ts) in timestamps.iter().enumerate() {
            let fields = (
                quote.open.get(i).copied().flatten(),
                quote.high.get(i).copied().flatten(),
                quote.low.get(i).copied().flatten(),
                quote.close.get(i).copied().flatten(),
            );
            match fields {
                (Some(open), Some(high), Some(low), Some(close)) => {
                    let timestamp = Utc
                        .timestamp_opt(ts, 0)
                        .single()
                        .ok_or_else(|| anyhow!("invalid bar timestamp {}", ts))?;
                    bars.push(PriceBar {
                        timestamp,
                        open,
                        high,
                        low,
                        close,
                    });
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!("dropped {} incomplete bars", dropped);
        }

        Ok(PriceSeries::new(bars))
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}
