//! Champion Trade Telegram bot
//!
//! Commands and actions built on the `bot-core` handler contract, the web app
//! trade flow, the Telegram transport and the composition root that wires
//! them together.

pub mod actions;
pub mod bot;
pub mod commands;
pub mod config;
pub mod error;
pub mod telegram;
pub mod templates;
pub mod trade;

pub use bot::ChampionBot;
pub use config::{BotConfig, BotConfigBuilder};
pub use error::TradeError;
pub use telegram::{TelegramApi, UpdateSource};
pub use trade::{TradeReceipt, TradeService};
