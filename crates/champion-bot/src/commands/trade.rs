//! `/trade` command

use crate::config::BotConfig;
use crate::templates::TRADE_PROMPT;
use async_trait::async_trait;
use bot_core::{
    Handler, HandlerFamily, InlineKeyboardButton, InlineKeyboardMarkup, OutgoingMessage, Result,
    Transport, Update,
};
use std::sync::Arc;
use tracing::debug;

/// Points the user at the trading web app
pub struct TradeCommand {
    transport: Arc<dyn Transport>,
    config: Arc<BotConfig>,
}

impl TradeCommand {
    /// Factory registered under `trade`
    pub fn create(
        transport: Arc<dyn Transport>,
        config: Arc<BotConfig>,
    ) -> Result<Arc<dyn Handler>> {
        Ok(Arc::new(Self { transport, config }))
    }
}

#[async_trait]
impl Handler for TradeCommand {
    fn family(&self) -> HandlerFamily {
        HandlerFamily::Command
    }

    fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    async fn handle(&self, update: &Update) -> Result<()> {
        let chat_id = update.reply_chat_id()?;
        let keyboard = InlineKeyboardMarkup::new().row(vec![InlineKeyboardButton::web_app(
            "Open app",
            &self.config.web_app_host_url,
        )]);

        self.transport
            .send_message(chat_id, OutgoingMessage::text(TRADE_PROMPT).keyboard(keyboard))
            .await?;

        debug!(
            user = ?self.user_info(update),
            message_template = "TRADE_PROMPT",
            command = "trade",
            "User accessed trade command"
        );
        Ok(())
    }
}
