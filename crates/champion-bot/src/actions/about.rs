//! `about` button

use crate::config::BotConfig;
use crate::templates::ABOUT;
use async_trait::async_trait;
use bot_core::{
    Handler, HandlerFamily, InlineKeyboardButton, InlineKeyboardMarkup, OutgoingMessage, Result,
    Transport, Update,
};
use std::sync::Arc;
use tracing::debug;

/// Describes Champion Trade and offers the web app
pub struct AboutAction {
    transport: Arc<dyn Transport>,
    config: Arc<BotConfig>,
}

impl AboutAction {
    /// Factory registered under `about`
    pub fn create(
        transport: Arc<dyn Transport>,
        config: Arc<BotConfig>,
    ) -> Result<Arc<dyn Handler>> {
        Ok(Arc::new(Self { transport, config }))
    }
}

#[async_trait]
impl Handler for AboutAction {
    fn family(&self) -> HandlerFamily {
        HandlerFamily::Action
    }

    fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    async fn handle(&self, update: &Update) -> Result<()> {
        let chat_id = update.reply_chat_id()?;
        let keyboard = InlineKeyboardMarkup::new().row(vec![InlineKeyboardButton::web_app(
            "Start trading",
            &self.config.web_app_host_url,
        )]);

        self.transport
            .send_message(chat_id, OutgoingMessage::text(ABOUT).keyboard(keyboard))
            .await?;

        debug!(
            user = ?self.user_info(update),
            action_type = "about",
            message_template = "ABOUT",
            web_app_host_url = %self.config.web_app_host_url,
            "User viewed about info"
        );
        Ok(())
    }
}
