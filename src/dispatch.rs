use log::{info, warn};

use crate::analysis::MarketMonitor;
use crate::clock;

/// Menu sent ahead of every reply so users can see what the bot understands.
pub const PROMPT_MENU: &str =
    "Prompt : \nMarket\nNews\nMarket opened/closed notification\nEntry notification\nExit notification";

/// Recognized text commands. Parsing is a lookup on the lowercased, trimmed
/// message text; anything else falls through to the unknown-command reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Hi,
    Time,
    Rima,
    Akka,
    Owner,
    CoFounder,
    Market,
    News,
    MarketOpenCloseNotification,
    EntryNotification,
    ExitNotification,
}

impl Command {
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.trim().to_lowercase();
        let command = match token.as_str() {
            "hi" => Command::Hi,
            "time" => Command::Time,
            "rima" => Command::Rima,
            "akka" => Command::Akka,
            "owner" | "ceo" => Command::Owner,
            "co-founder" | "cofounder" => Command::CoFounder,
            "market" => Command::Market,
            "news" => Command::News,
            "market opened/closed notification" => Command::MarketOpenCloseNotification,
            "entry notification" => Command::EntryNotification,
            "exit notification" => Command::ExitNotification,
            _ => return None,
        };
        Some(command)
    }
}

/// Routes incoming message text to a handler and collects the replies.
pub struct Dispatcher {
    monitor: MarketMonitor,
}

impl Dispatcher {
    pub fn new(monitor: MarketMonitor) -> Self {
        Self { monitor }
    }

    /// Handle one message. Always returns the prompt menu first, then the
    /// command's reply (or the unknown-command fallback).
    pub async fn handle(&self, text: &str) -> Vec<String> {
        let mut replies = vec![PROMPT_MENU.to_string()];
        replies.push(self.reply_for(text).await);
        replies
    }

    async fn reply_for(&self, text: &str) -> String {
        let Some(command) = Command::parse(text) else {
            return "Your prompt is not defined in the code".to_string();
        };
        info!("handling command {:?}", command);

        match command {
            Command::Hi => "HI, Rithik".to_string(),
            Command::Time => format!(
                "Current IST time: {}",
                clock::ist_now().format("%Y-%m-%d %H:%M:%S IST")
            ),
            Command::Rima => "Crystal".to_string(),
            Command::Akka => "Investor - Chanoja".to_string(),
            Command::Owner => "Rithik".to_string(),
            Command::CoFounder => "Prasanna".to_string(),
            Command::Market => match self.monitor.run().await {
                Ok(report) => report.to_string(),
                Err(e) => {
                    warn!("market analysis failed: {:#}", e);
                    format!("❌ Market analysis failed: {:#}", e)
                }
            },
            Command::News
            | Command::MarketOpenCloseNotification
            | Command::EntryNotification
            | Command::ExitNotification => "[under construction]".to_string(),
        }
    }
}
