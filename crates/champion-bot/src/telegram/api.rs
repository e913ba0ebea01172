//! HTTP calls to the Telegram Bot API
//!
//! Every method posts a JSON body to `{base}/bot{token}/{method}` and
//! unwraps the `{ok, description, result}` envelope.

use super::poller::UpdateSource;
use async_trait::async_trait;
use bot_core::{BotError, MenuCommand, OutgoingMessage, Result, Transport, Update, User};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Messages per second the platform accepts from one bot
pub const DEFAULT_SEND_RATE: u32 = 30;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Response envelope of every Bot API method
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Telegram Bot API client
pub struct TelegramApi {
    client: Client,
    base_url: String,
    send_limiter: SharedRateLimiter,
}

impl TelegramApi {
    /// Create a client for the given bot token
    pub fn new(bot_token: &str) -> Self {
        Self::with_base_url(bot_token, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom API host
    pub fn with_base_url(bot_token: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("{}/bot{}", base_url.trim_end_matches('/'), bot_token),
            send_limiter: send_limiter(DEFAULT_SEND_RATE),
        }
    }

    /// Limit outgoing messages to `per_second`
    pub fn with_send_rate(mut self, per_second: u32) -> Self {
        self.send_limiter = send_limiter(per_second);
        self
    }

    /// The bot's own account
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &json!({})).await
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(&self, offset: Option<i64>, timeout: Duration) -> Result<Vec<Update>> {
        let mut body = json!({
            "timeout": timeout.as_secs(),
            "allowed_updates": ["message", "callback_query"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        self.call("getUpdates", &body).await
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T> {
        let response = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| http_error(method, e))?;

        let api: ApiResponse<T> = response.json().await.map_err(|e| http_error(method, e))?;
        if !api.ok {
            let description = api.description.unwrap_or_default();
            warn!(method, description = %description, "Bot API call failed");
            return Err(BotError::Transport(format!("{method} failed: {description}")));
        }

        api.result
            .ok_or_else(|| BotError::Transport(format!("{method} returned no result")))
    }
}

fn send_limiter(per_second: u32) -> SharedRateLimiter {
    let quota = Quota::per_second(NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Transport error without the request URL, which embeds the token
fn http_error(method: &str, err: reqwest::Error) -> BotError {
    BotError::Transport(format!("{method} request failed: {}", err.without_url()))
}

/// `sendMessage` body
fn message_body(chat_id: i64, message: &OutgoingMessage) -> Result<Value> {
    let mut body = serde_json::to_value(message)?;
    body["chat_id"] = json!(chat_id);
    Ok(body)
}

/// `sendPhoto` body, carrying the message text as caption
fn photo_body(chat_id: i64, photo_url: &str, message: &OutgoingMessage) -> Result<Value> {
    let mut body = json!({
        "chat_id": chat_id,
        "photo": photo_url,
        "caption": message.text,
    });
    if let Some(mode) = message.parse_mode {
        body["parse_mode"] = serde_json::to_value(mode)?;
    }
    if let Some(markup) = &message.reply_markup {
        body["reply_markup"] = serde_json::to_value(markup)?;
    }
    Ok(body)
}

#[async_trait]
impl Transport for TelegramApi {
    async fn send_message(&self, chat_id: i64, message: OutgoingMessage) -> Result<i64> {
        self.send_limiter.until_ready().await;
        debug!(chat_id, "sendMessage");
        let sent: SentMessage = self
            .call("sendMessage", &message_body(chat_id, &message)?)
            .await?;
        Ok(sent.message_id)
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        message: OutgoingMessage,
    ) -> Result<i64> {
        self.send_limiter.until_ready().await;
        debug!(chat_id, photo_url, "sendPhoto");
        let sent: SentMessage = self
            .call("sendPhoto", &photo_body(chat_id, photo_url, &message)?)
            .await?;
        Ok(sent.message_id)
    }

    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &json!({ "callback_query_id": callback_query_id }),
            )
            .await?;
        Ok(())
    }

    async fn set_my_commands(&self, commands: &[MenuCommand]) -> Result<()> {
        let _: bool = self
            .call("setMyCommands", &json!({ "commands": commands }))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UpdateSource for TelegramApi {
    async fn get_updates(&self, offset: Option<i64>, timeout: Duration) -> Result<Vec<Update>> {
        TelegramApi::get_updates(self, offset, timeout).await
    }
}
