use std::fmt::{self, Write as _};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, FixedOffset};
use log::{info, warn};

use crate::classify::{ClassificationResult, IndicatorSnapshot, Recommendation, classify};
use crate::clock;
use crate::config::MarketConfig;
use crate::market_data::{PriceSeries, YahooClient};
use crate::oscillator::impulse_macd;
use crate::trend::{linreg_endpoint, slope_estimate, trend_ema};

/// CSV header of the analysis log. Buy/Sell/Profit-Loss stay empty and are
/// filled in by hand when reviewing trades.
pub const LOG_HEADER: [&str; 10] = [
    "Datetime",
    "Nifty50",
    "EMA Signal",
    "Candle Color",
    "Candle vs EMA7",
    "MACD State",
    "Market Condition",
    "Buy",
    "Sell",
    "Profit/Loss",
];

/// One complete analysis pass: the numbers, their labels, and when they were
/// produced. Rendering and logging both read from this.
#[derive(Debug, Clone)]
pub struct MarketReport {
    pub snapshot: IndicatorSnapshot,
    pub classification: ClassificationResult,
    pub generated_at: DateTime<FixedOffset>,
}

/// Fetches bars, runs the indicator pipeline, classifies, renders, and logs.
/// The only component with I/O side effects.
pub struct MarketMonitor {
    client: YahooClient,
    config: MarketConfig,
    log_path: PathBuf,
}

impl MarketMonitor {
    pub fn new(client: YahooClient, config: MarketConfig, log_path: impl Into<PathBuf>) -> Self {
        Self {
            client,
            config,
            log_path: log_path.into(),
        }
    }

    /// Fetch → compute → classify → log. Returns the report even when the
    /// log append fails; that failure is only warned about, since the text
    /// output does not depend on it.
    pub async fn run(&self) -> Result<MarketReport> {
        let series = self
            .client
            .fetch_bars(&self.config.symbol, &self.config.range, &self.config.interval)
            .await
            .context("market data fetch failed")?;

        let snapshot = compute_snapshot(&series, &self.config)?;
        let classification = classify(&snapshot);
        let report = MarketReport {
            snapshot,
            classification,
            generated_at: clock::ist_now(),
        };

        if let Err(e) = append_log(&self.log_path, &report) {
            warn!("analysis log append failed: {:#}", e);
        }

        info!(
            "analysis complete: close {:.2}, recommendation {:?}",
            report.snapshot.close, report.classification.recommendation
        );
        Ok(report)
    }
}

/// Run the numeric pipeline over a fetched series and take the latest values.
///
/// Guards against series shorter than the longest window (EMA200) so the
/// classifier never sees half-warmed indicators.
pub fn compute_snapshot(series: &PriceSeries, config: &MarketConfig) -> Result<IndicatorSnapshot> {
    let required = 200usize
        .max(config.length_ma + config.length_signal)
        .max(config.linreg_window)
        .max(config.slope_window);
    if series.len() < required {
        return Err(anyhow!(
            "insufficient history: got {} bars, need at least {}",
            series.len(),
            required
        ));
    }

    let closes = series.closes();
    let opens = series.opens();

    let macd = impulse_macd(series, config.length_ma, config.length_signal)?;
    let histogram = macd
        .latest_histogram()
        .ok_or_else(|| anyhow!("impulse MACD produced no defined histogram value"))?;

    let ema7 = trend_ema(&closes, 7);
    let ema50 = trend_ema(&closes, 50);
    let ema200 = trend_ema(&closes, 200);

    let lin_open = linreg_endpoint(&opens, config.linreg_window)?;
    let lin_close = linreg_endpoint(&closes, config.linreg_window)?;

    let last = series.len() - 1;
    Ok(IndicatorSnapshot {
        close: closes[last],
        ema7: ema7[last],
        ema50: ema50[last],
        ema200: ema200[last],
        lin_open: lin_open[last],
        lin_close: lin_close[last],
        ema7_slope: slope_estimate(&ema7, config.slope_window)?,
        ema50_slope: slope_estimate(&ema50, config.slope_window)?,
        ema200_slope: slope_estimate(&ema200, config.slope_window)?,
        histogram,
    })
}

/// Append one row to the CSV log, writing the header first when the file does
/// not exist yet. The log is append-only; nothing ever rewrites it.
pub fn append_log(path: &Path, report: &MarketReport) -> Result<()> {
    let is_new = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open analysis log {}", path.display()))?;

    let mut writer = csv::Writer::from_writer(file);
    if is_new {
        writer.write_record(LOG_HEADER)?;
    }

    let snap = &report.snapshot;
    let class = &report.classification;
    writer.write_record([
        report.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        format!("{:.2}", snap.close),
        class.cross.to_string(),
        class.color.to_string(),
        class.ema_relation.log_label().to_string(),
        class.histogram_state.to_string(),
        market_condition_label(class).to_string(),
        String::new(),
        String::new(),
        String::new(),
    ])?;
    writer
        .flush()
        .with_context(|| format!("cannot flush analysis log {}", path.display()))?;

    Ok(())
}

fn market_condition_label(class: &ClassificationResult) -> &'static str {
    if class.oscillator_sideways {
        "Sideways (−10 to +10)"
    } else {
        "Trending"
    }
}

impl fmt::Display for MarketReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snap = &self.snapshot;
        let class = &self.classification;
        let rule = "-".repeat(80);
        let frame = "=".repeat(80);

        let mut out = String::new();
        writeln!(out, "{}", frame)?;
        writeln!(
            out,
            "📊  Market Analysis — {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(out, "{}", frame)?;

        writeln!(out, "\n📈 Price & EMA Overview")?;
        writeln!(out, "{}", rule)?;
        writeln!(out, "🔹 Latest Close Price : ₹{:.2}", snap.close)?;
        writeln!(
            out,
            "🔸 EMA7 : {:.2}   |   EMA50 : {:.2}   |   EMA200 : {:.2}",
            snap.ema7, snap.ema50, snap.ema200
        )?;
        writeln!(out, "📍 EMA Signal : {}", class.cross)?;
        writeln!(out, "🔄 EMA 50/200 Trend : {}", class.ema_trend)?;

        writeln!(out, "\n🕯️ Candle Analysis")?;
        writeln!(out, "{}", rule)?;
        writeln!(out, "🟢 Type     : {}", class.color)?;
        writeln!(
            out,
            "💪 Strength : {} ({:.2}%)",
            class.strength, class.strength_pct
        )?;

        writeln!(out, "\n📐 Position Relative to EMA7")?;
        writeln!(out, "{}", rule)?;
        let relation = match class.ema_relation {
            crate::classify::EmaRelation::Above => {
                "Candle is above the 7 EMA (Bullish / Uptrend)"
            }
            crate::classify::EmaRelation::Below => {
                "Candle is below the 7 EMA (Bearish / Downtrend)"
            }
            crate::classify::EmaRelation::At => "Candle is at the 7 EMA",
        };
        writeln!(out, "➡️ {}", relation)?;
        let touching = if class.ema_touching {
            "Yes, 7 EMA is touching the candle (between linear open and close)"
        } else {
            "No, 7 EMA is not touching the candle"
        };
        writeln!(out, "🤝 EMA Touching Candle? : {}", touching)?;
        writeln!(
            out,
            "📊 EMA7 Slope : {}",
            if class.ema7_sideways {
                "📏 Sideways"
            } else {
                "📈 Trending"
            }
        )?;

        writeln!(out, "\n💹 Impulse MACD Histogram")?;
        writeln!(out, "{}", rule)?;
        writeln!(
            out,
            "🧭 State : {} ({:.6})",
            class.histogram_state, snap.histogram
        )?;
        writeln!(
            out,
            "📉 Market Condition : {}",
            if class.oscillator_sideways {
                "🔁 Sideways (−10 to +10)"
            } else {
                "📊 Trending"
            }
        )?;

        writeln!(out, "\n📢 Trade Recommendations")?;
        writeln!(out, "{}", rule)?;
        let line = match class.recommendation {
            Recommendation::Buy => {
                "✅ BUY Signal : Strong bullish candle above EMA7 with Golden Cross and trending MACD"
            }
            Recommendation::Sell => {
                "🔻 SELL Signal : Strong bearish candle below EMA7 with Death Cross and trending MACD"
            }
            Recommendation::Hold => "⏸️ HOLD / AVOID : Sideways market or unclear signal",
            Recommendation::NoClearSignal => {
                "⚠️ No clear entry signal. Wait for stronger confirmation."
            }
        };
        writeln!(out, "{}", line)?;
        writeln!(out, "{}", frame)?;

        f.write_str(&out)
    }
}
