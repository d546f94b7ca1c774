use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::Deserialize;

/// Telegram Bot API response envelope.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Minimal Telegram Bot API client: long-poll `getUpdates` plus
/// `sendMessage`. The token never appears in logs.
pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("https://api.telegram.org/bot{}", token),
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Long-poll for updates after `offset`. Blocks up to `timeout_secs`
    /// server-side; the reqwest timeout is padded past that.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let url = format!("{}/getUpdates", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout_secs.to_string()),
            ])
            .timeout(std::time::Duration::from_secs(timeout_secs + 10))
            .send()
            .await
            .context("getUpdates request failed")?;

        let payload: ApiResponse<Vec<Update>> = response
            .json()
            .await
            .context("invalid getUpdates payload")?;

        if !payload.ok {
            return Err(anyhow!(
                "getUpdates rejected: {}",
                payload.description.unwrap_or_else(|| "unknown error".into())
            ));
        }

        let updates = payload.result.unwrap_or_default();
        debug!("received {} updates", updates.len());
        Ok(updates)
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let url = format!("{}/sendMessage", self.base_url);
        let response = self
            .client
            .post(&url)
            .form(&[("chat_id", chat_id.to_string()), ("text", text.to_string())])
            .send()
            .await
            .context("sendMessage request failed")?;

        let payload: ApiResponse<serde_json::Value> = response
            .json()
            .await
            .context("invalid sendMessage payload")?;

        if !payload.ok {
            return Err(anyhow!(
                "sendMessage rejected for chat {}: {}",
                chat_id,
                payload.description.unwrap_or_else(|| "unknown error".into())
            ));
        }

        Ok(())
    }
}
