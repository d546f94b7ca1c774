//! Nifty50 market monitor bot.
//!
//! A Telegram-driven notification bot around one deterministic indicator
//! pipeline: Impulse MACD plus EMA/linear-regression trend analysis over
//! 5-minute index bars, classified into categorical trade signals, rendered
//! as a text report, and appended to a CSV log.

pub mod analysis;
pub mod classify;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod market_data;
pub mod oscillator;
pub mod scheduler;
pub mod smoothing;
pub mod telegram;
pub mod trend;
