//! Callback and web app handlers

pub mod about;
pub mod web_app_data;

pub use about::AboutAction;
pub use web_app_data::{WebAppDataHandler, WebAppEnvelope};

use crate::config::BotConfig;
use bot_handlers::{ActionRegistry, HandlerMetadata};

/// Register every action
pub fn register_actions(registry: &mut ActionRegistry<BotConfig>) {
    registry.register(
        "about",
        AboutAction::create,
        HandlerMetadata::new("About Champion Trade").with("type", "button"),
    );
    registry.register(
        "webapp_data",
        WebAppDataHandler::create,
        HandlerMetadata::new("Handle web app data").with("type", "webapp"),
    );
}
