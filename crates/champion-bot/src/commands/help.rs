//! `/help` command

use crate::config::BotConfig;
use crate::templates::HELP_GUIDE;
use async_trait::async_trait;
use bot_core::{
    Handler, HandlerFamily, InlineKeyboardButton, InlineKeyboardMarkup, OutgoingMessage, Result,
    Transport, Update,
};
use std::sync::Arc;
use tracing::debug;

/// Shows the support guide
pub struct HelpCommand {
    transport: Arc<dyn Transport>,
    config: Arc<BotConfig>,
}

impl HelpCommand {
    /// Factory registered under `help`
    pub fn create(
        transport: Arc<dyn Transport>,
        config: Arc<BotConfig>,
    ) -> Result<Arc<dyn Handler>> {
        Ok(Arc::new(Self { transport, config }))
    }
}

#[async_trait]
impl Handler for HelpCommand {
    fn family(&self) -> HandlerFamily {
        HandlerFamily::Command
    }

    fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    async fn handle(&self, update: &Update) -> Result<()> {
        let chat_id = update.reply_chat_id()?;
        let keyboard = InlineKeyboardMarkup::new().row(vec![InlineKeyboardButton::url(
            "Support 🌟",
            &self.config.support_url,
        )]);

        self.transport
            .send_message(
                chat_id,
                OutgoingMessage::text(HELP_GUIDE).html().keyboard(keyboard),
            )
            .await?;

        debug!(
            user = ?self.user_info(update),
            message_template = "HELP_GUIDE",
            support_url = %self.config.support_url,
            "User requested help"
        );
        Ok(())
    }
}
