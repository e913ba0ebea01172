//! `/start` command

use crate::config::BotConfig;
use crate::templates::MessageTemplates;
use async_trait::async_trait;
use bot_core::{
    Handler, HandlerFamily, InlineKeyboardButton, InlineKeyboardMarkup, LinkPreviewOptions,
    OutgoingMessage, Result, Transport, Update,
};
use std::sync::Arc;
use tracing::debug;

/// Greets the user with the welcome photo and entry points
pub struct StartCommand {
    transport: Arc<dyn Transport>,
    config: Arc<BotConfig>,
    templates: MessageTemplates,
}

impl StartCommand {
    /// Factory registered under `start`
    pub fn create(
        transport: Arc<dyn Transport>,
        config: Arc<BotConfig>,
    ) -> Result<Arc<dyn Handler>> {
        Ok(Arc::new(Self {
            transport,
            config,
            templates: MessageTemplates::new()?,
        }))
    }

    fn keyboard(&self) -> InlineKeyboardMarkup {
        InlineKeyboardMarkup::new()
            .row(vec![InlineKeyboardButton::web_app(
                "Trade Now! 📈",
                &self.config.web_app_host_url,
            )])
            .row(vec![
                InlineKeyboardButton::callback("About", "about"),
                InlineKeyboardButton::url("Explore More 🌟", &self.config.learn_more_url),
            ])
    }
}

#[async_trait]
impl Handler for StartCommand {
    fn family(&self) -> HandlerFamily {
        HandlerFamily::Command
    }

    fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    async fn handle(&self, update: &Update) -> Result<()> {
        let chat_id = update.reply_chat_id()?;
        let caption = self.templates.welcome(&self.config.web_app_url)?;

        let message = OutgoingMessage::text(caption)
            .html()
            .keyboard(self.keyboard())
            .link_preview(LinkPreviewOptions {
                is_disabled: false,
                url: Some(self.config.learn_more_url.clone()),
                prefer_small_media: true,
            });

        self.transport
            .send_photo(chat_id, &self.config.welcome_photo_url, message)
            .await?;

        debug!(
            user = ?self.user_info(update),
            message_template = "WELCOME",
            web_app_url = %self.config.web_app_url,
            web_app_host_url = %self.config.web_app_host_url,
            learn_more_url = %self.config.learn_more_url,
            "New user started bot"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::command_update;
    use crate::config::test_config;
    use bot_core::ButtonAction;
    use bot_core::testing::RecordingTransport;

    #[tokio::test]
    async fn test_start_sends_welcome_photo() {
        let transport = Arc::new(RecordingTransport::new());
        let config = Arc::new(test_config());
        let handler = StartCommand::create(transport.clone(), config.clone()).unwrap();

        handler.handle(&command_update("/start")).await.unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        let photo = &sent[0];
        assert_eq!(photo.chat_id, 77);
        assert_eq!(photo.photo_url.as_deref(), Some(config.welcome_photo_url.as_str()));
        assert!(photo.message.text.contains(&config.web_app_url));
        assert_eq!(photo.message.parse_mode, Some(bot_core::ParseMode::Html));

        let keyboard = photo.message.reply_markup.as_ref().unwrap();
        assert_eq!(
            keyboard.inline_keyboard[0][0].action,
            ButtonAction::WebApp(bot_core::WebAppInfo {
                url: config.web_app_host_url.clone()
            })
        );
        assert_eq!(
            keyboard.inline_keyboard[1][0].action,
            ButtonAction::CallbackData("about".to_string())
        );
        assert_eq!(
            keyboard.inline_keyboard[1][1].action,
            ButtonAction::Url(config.learn_more_url.clone())
        );
    }

    #[tokio::test]
    async fn test_start_propagates_send_failure() {
        let transport = Arc::new(RecordingTransport::new().failing_sends());
        let handler = StartCommand::create(transport, Arc::new(test_config())).unwrap();
        assert!(handler.handle(&command_update("/start")).await.is_err());
    }
}
