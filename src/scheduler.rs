use anyhow::Result;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use log::info;

use crate::config::AlertConfig;

/// One fixed-clock daily alert with its fired-today state. `fired_on` is the
/// day-rollover mechanism: an alert re-arms as soon as the date changes.
#[derive(Debug, Clone)]
pub struct DailyAlert {
    pub time: NaiveTime,
    pub message: String,
    fired_on: Option<NaiveDate>,
}

/// Drives the daily alerts from a single timer tick instead of a busy-sleep
/// loop. On restart mid-day, alerts whose time already passed fire once
/// immediately; they are not suppressed.
#[derive(Debug, Default)]
pub struct AlertScheduler {
    alerts: Vec<DailyAlert>,
}

impl AlertScheduler {
    pub fn new(alerts: Vec<DailyAlert>) -> Self {
        Self { alerts }
    }

    pub fn from_config(configs: &[AlertConfig]) -> Result<Self> {
        let alerts = configs
            .iter()
            .map(|c| {
                Ok(DailyAlert {
                    time: c.parsed_time()?,
                    message: c.message.clone(),
                    fired_on: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(alerts))
    }

    /// Collect the messages of all alerts due at `now`, marking them fired
    /// for that date. Call this on every tick.
    pub fn due(&mut self, now: DateTime<FixedOffset>) -> Vec<String> {
        let today = now.date_naive();
        let time_now = now.time();
        let mut fired = Vec::new();

        for alert in &mut self.alerts {
            if alert.time <= time_now && alert.fired_on != Some(today) {
                alert.fired_on = Some(today);
                info!("alert fired at {}: {}", alert.time, alert.message);
                fired.push(alert.message.clone());
            }
        }

        fired
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }
}
