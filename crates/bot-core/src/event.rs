//! Inbound platform events
//!
//! Serde types for the subset of the Telegram Bot API update model the bot
//! consumes. Unknown fields are ignored; optional fields map to `None`.

use crate::{BotError, Result};
use serde::{Deserialize, Serialize};

/// A single inbound update delivered by the transport
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_query: Option<CallbackQuery>,
}

/// A chat message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Service payload sent by an embedded web app
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_app_data: Option<WebAppData>,
}

/// The user an update originates from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// A chat
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub chat_type: Option<String>,
}

/// An inline keyboard button press
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Data handed back by an embedded web app
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebAppData {
    /// Raw payload string produced by the web app
    pub data: String,
    #[serde(default)]
    pub button_text: String,
}

/// What an update asks the bot to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// A slash command message
    Command,
    /// A callback query from an inline button
    Callback,
    /// A web app data service message
    WebAppData,
    /// Anything the bot does not route
    Other,
}

impl Update {
    /// Classify the update for routing
    pub fn kind(&self) -> UpdateKind {
        if self.callback_query.is_some() {
            return UpdateKind::Callback;
        }
        match &self.message {
            Some(msg) if msg.web_app_data.is_some() => UpdateKind::WebAppData,
            Some(msg) if msg.text.as_deref().is_some_and(|t| t.starts_with('/')) => {
                UpdateKind::Command
            }
            _ => UpdateKind::Other,
        }
    }

    /// The originating user, if the update carries one
    pub fn from_user(&self) -> Option<&User> {
        if let Some(cb) = &self.callback_query {
            return Some(&cb.from);
        }
        self.message.as_ref().and_then(|m| m.from.as_ref())
    }

    /// Chat to reply into
    ///
    /// Callback queries without an attached message fall back to the user's
    /// private chat, whose id equals the user id.
    pub fn chat_id(&self) -> Option<i64> {
        if let Some(msg) = &self.message {
            return Some(msg.chat.id);
        }
        let cb = self.callback_query.as_ref()?;
        Some(cb.message.as_ref().map_or(cb.from.id, |m| m.chat.id))
    }

    /// Chat to reply into, or a validation error for chat-less updates
    pub fn reply_chat_id(&self) -> Result<i64> {
        self.chat_id()
            .ok_or_else(|| BotError::Validation("update has no chat to reply to".to_string()))
    }

    /// Message text, used as the command context in error records
    pub fn text(&self) -> Option<&str> {
        self.message.as_ref().and_then(|m| m.text.as_deref())
    }

    /// Callback data, used as the action context in error records
    pub fn callback_data(&self) -> Option<&str> {
        self.callback_query.as_ref().and_then(|cb| cb.data.as_deref())
    }

    /// Callback query id to acknowledge
    pub fn callback_query_id(&self) -> Option<&str> {
        self.callback_query.as_ref().map(|cb| cb.id.as_str())
    }

    /// Web app payload, if this is a web app data message
    pub fn web_app_data(&self) -> Option<&WebAppData> {
        self.message.as_ref().and_then(|m| m.web_app_data.as_ref())
    }

    /// Command name without the leading slash or `@botname` suffix
    pub fn command_name(&self) -> Option<&str> {
        let text = self.text()?.strip_prefix('/')?;
        let token = text.split_whitespace().next()?;
        let name = token.split('@').next().unwrap_or(token);
        (!name.is_empty()).then_some(name)
    }

    /// Bot username a command is addressed to, from the `/name@botname` form
    pub fn command_target(&self) -> Option<&str> {
        let text = self.text()?.strip_prefix('/')?;
        let token = text.split_whitespace().next()?;
        token.split_once('@').map(|(_, target)| target)
    }
}

/// Projection of the originating user used in logs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub language_code: Option<String>,
}

impl UserInfo {
    /// Project the update's user; an update without a user yields id 0
    pub fn from_update(update: &Update) -> Self {
        update.from_user().map(Self::from).unwrap_or_default()
    }
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            language_code: user.language_code.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_command_update() {
        let json = r#"{
            "update_id": 10,
            "message": {
                "message_id": 5,
                "from": {"id": 123, "is_bot": false, "first_name": "Test", "username": "testuser"},
                "chat": {"id": 123, "type": "private"},
                "date": 1700000000,
                "text": "/start@ChampionBot deep-link"
            }
        }"#;
        let update: Update = serde_json::from_str(json).unwrap();
        assert_eq!(update.kind(), UpdateKind::Command);
        assert_eq!(update.command_name(), Some("start"));
        assert_eq!(update.chat_id(), Some(123));
        assert_eq!(update.from_user().unwrap().username.as_deref(), Some("testuser"));
    }

    #[test]
    fn test_deserialize_web_app_data_update() {
        let json = r#"{
            "update_id": 11,
            "message": {
                "message_id": 6,
                "from": {"id": 123, "is_bot": false, "first_name": "Test"},
                "chat": {"id": 123, "type": "private"},
                "web_app_data": {"data": "{\"type\":\"trade\"}", "button_text": "Trade Now!"}
            }
        }"#;
        let update: Update = serde_json::from_str(json).unwrap();
        assert_eq!(update.kind(), UpdateKind::WebAppData);
        assert_eq!(update.web_app_data().unwrap().data, r#"{"type":"trade"}"#);
        assert_eq!(update.command_name(), None);
    }

    #[test]
    fn test_callback_without_message_replies_to_user() {
        let update = Update {
            update_id: 1,
            callback_query: Some(CallbackQuery {
                id: "cb-1".to_string(),
                from: User {
                    id: 42,
                    ..Default::default()
                },
                message: None,
                data: Some("about".to_string()),
            }),
            ..Default::default()
        };
        assert_eq!(update.kind(), UpdateKind::Callback);
        assert_eq!(update.chat_id(), Some(42));
        assert_eq!(update.callback_data(), Some("about"));
        assert_eq!(update.callback_query_id(), Some("cb-1"));
        assert_eq!(update.reply_chat_id().unwrap(), 42);
    }

    #[test]
    fn test_empty_update_has_no_reply_chat() {
        let update = Update::default();
        assert_eq!(update.kind(), UpdateKind::Other);
        assert!(matches!(update.reply_chat_id(), Err(BotError::Validation(_))));
    }

    #[test]
    fn test_plain_text_is_not_routed() {
        let update = Update {
            update_id: 2,
            message: Some(Message {
                text: Some("hello".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(update.kind(), UpdateKind::Other);
        assert_eq!(update.command_name(), None);
    }

    #[test]
    fn test_command_target() {
        let command = |text: &str| Update {
            update_id: 4,
            message: Some(Message {
                text: Some(text.to_string()),
                ..Default::default()
            }),
            callback_query: None,
        };

        let addressed = command("/start@ChampionTradeBot now");
        assert_eq!(addressed.command_name(), Some("start"));
        assert_eq!(addressed.command_target(), Some("ChampionTradeBot"));
        assert_eq!(command("/start").command_target(), None);
        assert_eq!(command("hello@there").command_target(), None);
    }

    #[test]
    fn test_user_info_missing_optional_fields() {
        let update = Update {
            update_id: 3,
            message: Some(Message {
                from: Some(User {
                    id: 123,
                    username: Some("testuser".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        let info = UserInfo::from_update(&update);
        assert_eq!(
            info,
            UserInfo {
                id: 123,
                username: Some("testuser".to_string()),
                first_name: None,
                last_name: None,
                language_code: None,
            }
        );
    }

    #[test]
    fn test_user_info_without_user() {
        let info = UserInfo::from_update(&Update::default());
        assert_eq!(info, UserInfo::default());
    }
}
