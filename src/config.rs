use anyhow::{Context, Result};
use chrono::NaiveTime;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub market: MarketConfig,
    #[serde(default = "default_alerts")]
    pub alerts: Vec<AlertConfig>,
    #[serde(default = "default_log_path")]
    pub log_path: String,
    /// Telegram long-poll timeout in seconds.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
    /// Scheduler tick period in seconds.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    /// Chats the bot talks to: commands from other chats are ignored and
    /// fixed-clock alerts go to every listed chat. An empty list answers
    /// commands from anyone and only logs alerts.
    #[serde(default)]
    pub chat_allowlist: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_range")]
    pub range: String,
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_length_ma")]
    pub length_ma: usize,
    #[serde(default = "default_length_signal")]
    pub length_signal: usize,
    #[serde(default = "default_linreg_window")]
    pub linreg_window: usize,
    #[serde(default = "default_slope_window")]
    pub slope_window: usize,
}

/// One fixed-clock daily alert, `time` in `%H:%M` IST.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    pub time: String,
    pub message: String,
}

impl AlertConfig {
    pub fn parsed_time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(&self.time, "%H:%M")
            .with_context(|| format!("invalid alert time {:?}, expected HH:MM", self.time))
    }
}

fn default_symbol() -> String {
    "^NSEI".to_string()
}
fn default_range() -> String {
    "7d".to_string()
}
fn default_interval() -> String {
    "5m".to_string()
}
fn default_length_ma() -> usize {
    34
}
fn default_length_signal() -> usize {
    9
}
fn default_linreg_window() -> usize {
    11
}
fn default_slope_window() -> usize {
    10
}
fn default_log_path() -> String {
    "market_analysis_log.csv".to_string()
}
fn default_poll_timeout_secs() -> u64 {
    30
}
fn default_tick_secs() -> u64 {
    20
}

fn default_alerts() -> Vec<AlertConfig> {
    [
        ("09:15", "🔔 Market opened"),
        ("10:15", "🔔 Entry window check"),
        ("14:30", "🔔 Exit window check"),
        ("15:15", "🔔 Market closing soon"),
    ]
    .into_iter()
    .map(|(time, message)| AlertConfig {
        time: time.to_string(),
        message: message.to_string(),
    })
    .collect()
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            range: default_range(),
            interval: default_interval(),
            length_ma: default_length_ma(),
            length_signal: default_length_signal(),
            linreg_window: default_linreg_window(),
            slope_window: default_slope_window(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            market: MarketConfig::default(),
            alerts: default_alerts(),
            log_path: default_log_path(),
            poll_timeout_secs: default_poll_timeout_secs(),
            tick_secs: default_tick_secs(),
            chat_allowlist: Vec::new(),
        }
    }
}

impl BotConfig {
    pub fn load() -> Result<Self> {
        Self::load_from_file("config.json")
    }

    /// Load config from a JSON file, falling back to defaults when the file
    /// is missing. Alert times are validated eagerly so a typo fails at
    /// startup rather than at alert time.
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                warn!("config file {} not readable ({}), using defaults", path, e);
                Self::default_config_json()
            }
        };

        let config: BotConfig = serde_json::from_str(&config_str)
            .with_context(|| format!("invalid config file {}", path))?;

        for alert in &config.alerts {
            alert.parsed_time()?;
        }

        Ok(config)
    }

    fn default_config_json() -> String {
        serde_json::to_string_pretty(&Self::default()).expect("default config serializes")
    }

    /// Whether a chat may issue commands. An empty allowlist permits all.
    pub fn chat_allowed(&self, chat_id: i64) -> bool {
        self.chat_allowlist.is_empty() || self.chat_allowlist.contains(&chat_id)
    }
}
