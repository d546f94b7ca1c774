use anyhow::{Context, Result};
use log::{error, info, warn};
use std::env;
use tokio::time::{Duration, interval, sleep};

use nifty_monitor::analysis::MarketMonitor;
use nifty_monitor::clock;
use nifty_monitor::config::BotConfig;
use nifty_monitor::dispatch::Dispatcher;
use nifty_monitor::market_data::YahooClient;
use nifty_monitor::scheduler::AlertScheduler;
use nifty_monitor::telegram::TelegramClient;

const ERROR_RETRY_DELAY: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger with default info level if RUST_LOG not set
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();
    info!("Starting Nifty50 Monitor Bot");

    // Get config file from command line argument or use default
    let args: Vec<String> = env::args().collect();
    let config_file = if args.len() > 1 {
        &args[1]
    } else {
        "config.json"
    };

    info!("Loading configuration from: {}", config_file);
    let config = BotConfig::load_from_file(config_file)?;

    let token = env::var("BOT_TOKEN").context("BOT_TOKEN environment variable not set")?;
    let bot = TelegramClient::new(&token);

    let monitor = MarketMonitor::new(
        YahooClient::new(),
        config.market.clone(),
        config.log_path.clone(),
    );
    let dispatcher = Dispatcher::new(monitor);
    let mut scheduler = AlertScheduler::from_config(&config.alerts)?;
    info!("{} daily alerts scheduled", scheduler.len());

    let mut tick = interval(Duration::from_secs(config.tick_secs));
    let mut offset = 0i64;

    info!("Bot started");
    loop {
        tokio::select! {
            _ = tick.tick() => {
                for message in scheduler.due(clock::ist_now()) {
                    if config.chat_allowlist.is_empty() {
                        warn!("alert due but chat_allowlist is empty: {}", message);
                        continue;
                    }
                    for &chat_id in &config.chat_allowlist {
                        if let Err(e) = bot.send_message(chat_id, &message).await {
                            error!("alert delivery to chat {} failed: {:#}", chat_id, e);
                        }
                    }
                }
            }
            updates = bot.get_updates(offset, config.poll_timeout_secs) => {
                let updates = match updates {
                    Ok(u) => u,
                    Err(e) => {
                        error!("update poll failed: {:#}", e);
                        sleep(ERROR_RETRY_DELAY).await;
                        continue;
                    }
                };

                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let Some(message) = update.message else { continue };
                    let Some(text) = message.text.as_deref() else { continue };
                    if !config.chat_allowed(message.chat.id) {
                        warn!("ignoring command from unlisted chat {}", message.chat.id);
                        continue;
                    }

                    for reply in dispatcher.handle(text).await {
                        if let Err(e) = bot.send_message(message.chat.id, &reply).await {
                            error!("reply delivery failed: {:#}", e);
                        }
                    }
                }
            }
        }
    }
}
