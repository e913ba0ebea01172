//! Slash command handlers

pub mod help;
pub mod start;
pub mod trade;

pub use help::HelpCommand;
pub use start::StartCommand;
pub use trade::TradeCommand;

use crate::config::BotConfig;
use bot_handlers::{CommandRegistry, HandlerMetadata};

/// Register every command, in menu order
pub fn register_commands(registry: &mut CommandRegistry<BotConfig>) {
    registry.register(
        "start",
        StartCommand::create,
        HandlerMetadata::new("Start the bot").with("usage", "/start"),
    );
    registry.register(
        "trade",
        TradeCommand::create,
        HandlerMetadata::new("Open trading interface").with("usage", "/trade"),
    );
    registry.register(
        "help",
        HelpCommand::create,
        HandlerMetadata::new("Show help information").with("usage", "/help"),
    );
}
