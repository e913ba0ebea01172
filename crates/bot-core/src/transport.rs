//! Outbound transport seam
//!
//! Handlers never talk to the platform directly. They hold an
//! `Arc<dyn Transport>` and send replies, photos and callback
//! acknowledgements through it.

use crate::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Text formatting mode for outgoing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
    MarkdownV2,
}

/// Target of an inline keyboard button
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    /// Sends a callback query with this data
    CallbackData(String),
    /// Opens an external link
    Url(String),
    /// Opens the embedded web app
    WebApp(WebAppInfo),
}

/// Embedded web app launch target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebAppInfo {
    pub url: String,
}

/// A single inline keyboard button
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(flatten)]
    pub action: ButtonAction,
}

impl InlineKeyboardButton {
    /// Button that sends callback data back to the bot
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::CallbackData(data.into()),
        }
    }

    /// Button that opens a link
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Url(url.into()),
        }
    }

    /// Button that launches the embedded web app
    pub fn web_app(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::WebApp(WebAppInfo { url: url.into() }),
        }
    }
}

/// Inline keyboard attached to a message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    /// Start an empty keyboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row of buttons
    pub fn row(mut self, buttons: Vec<InlineKeyboardButton>) -> Self {
        self.inline_keyboard.push(buttons);
        self
    }
}

/// Link preview settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkPreviewOptions {
    pub is_disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub prefer_small_media: bool,
}

/// An outgoing message body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_preview_options: Option<LinkPreviewOptions>,
}

impl OutgoingMessage {
    /// Plain text message
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Render as HTML
    pub fn html(mut self) -> Self {
        self.parse_mode = Some(ParseMode::Html);
        self
    }

    /// Attach an inline keyboard
    pub fn keyboard(mut self, markup: InlineKeyboardMarkup) -> Self {
        self.reply_markup = Some(markup);
        self
    }

    /// Set link preview options
    pub fn link_preview(mut self, options: LinkPreviewOptions) -> Self {
        self.link_preview_options = Some(options);
        self
    }
}

/// Entry of the bot's command menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuCommand {
    pub command: String,
    pub description: String,
}

/// Outbound operations the platform offers to handlers
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a message to a chat, returning the sent message id
    async fn send_message(&self, chat_id: i64, message: OutgoingMessage) -> Result<i64>;

    /// Send a photo with the message text as caption
    async fn send_photo(&self, chat_id: i64, photo_url: &str, message: OutgoingMessage)
    -> Result<i64>;

    /// Acknowledge a callback query
    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()>;

    /// Publish the command menu
    async fn set_my_commands(&self, commands: &[MenuCommand]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_serialization() {
        let markup = InlineKeyboardMarkup::new()
            .row(vec![InlineKeyboardButton::web_app(
                "Trade Now! 📈",
                "https://app.example.com",
            )])
            .row(vec![
                InlineKeyboardButton::callback("About", "about"),
                InlineKeyboardButton::url("Explore More 🌟", "https://example.com"),
            ]);

        let json = serde_json::to_value(&markup).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "inline_keyboard": [
                    [{"text": "Trade Now! 📈", "web_app": {"url": "https://app.example.com"}}],
                    [
                        {"text": "About", "callback_data": "about"},
                        {"text": "Explore More 🌟", "url": "https://example.com"}
                    ]
                ]
            })
        );
    }

    #[test]
    fn test_outgoing_message_builder() {
        let msg = OutgoingMessage::text("hi").html();
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, serde_json::json!({"text": "hi", "parse_mode": "HTML"}));
    }
}
