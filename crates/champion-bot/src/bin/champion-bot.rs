//! Champion Trade bot
//!
//! # Usage
//!
//! ```bash
//! export BOT_TOKEN="123456:ABC..."
//! export WEBAPP_URL="https://t.me/your_bot/app"
//! export WEBAPP_HOST_URL="https://app.example.com"
//!
//! cargo run --bin champion-bot -- --log-level debug
//! ```

use anyhow::Context;
use bot_utils::{LogLevel, init_tracing};
use champion_bot::{BotConfig, ChampionBot, TelegramApi};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "champion-bot")]
#[command(about = "Champion Trade Telegram bot", long_about = None)]
struct Args {
    /// Log level (DEBUG, INFO, WARN, ERROR, NONE); overrides LOG_LEVEL
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Long poll timeout in seconds; overrides POLL_TIMEOUT
    #[arg(long)]
    poll_timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = BotConfig::from_env().context("Failed to load configuration")?;
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    if let Some(secs) = args.poll_timeout {
        config.poll_timeout = Duration::from_secs(secs);
    }

    init_tracing(&config.logging().with_json(args.json_logs))?;

    info!(
        env = %config.environment,
        log_level = %config.log_level,
        "Starting Champion Trade Bot..."
    );

    let api = Arc::new(TelegramApi::new(&config.bot_token));
    let me = api.get_me().await.context("Failed to fetch bot identity")?;

    let mut bot = ChampionBot::new(config, api.clone()).context("Failed to initialize handlers")?;
    if let Some(username) = me.username {
        bot = bot.with_bot_username(username);
    }

    bot.run_until_ctrl_c(api.as_ref())
        .await
        .context("Failed to launch bot")?;

    Ok(())
}
