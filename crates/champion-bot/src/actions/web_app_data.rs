//! Web app data handler
//!
//! Receives the JSON envelope the web app sends back through the platform,
//! authenticates its signed init data and routes on the `type` field.

use crate::config::BotConfig;
use crate::templates::{
    ERROR_INVALID_DATA, ERROR_TRADE_PROCESSING, ERROR_WEB_APP, UNKNOWN_WEB_APP_DATA, web_app_error,
};
use crate::trade::TradeService;
use async_trait::async_trait;
use bot_core::{
    Binding, BotError, Handler, HandlerFamily, OutgoingMessage, Result, Transport, Trigger, Update,
};
use bot_webapp::{TradeOrder, WebAppValidator};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error};

pub const TYPE_TRADE: &str = "trade";
pub const TYPE_ERROR: &str = "error";

/// Payload the web app sends back
///
/// `initData` carries the platform-signed init data; every other key except
/// `type` is kept in `fields` for the type-specific handling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebAppEnvelope {
    #[serde(rename = "initData", default)]
    pub init_data: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Authenticates and processes web app payloads
pub struct WebAppDataHandler {
    transport: Arc<dyn Transport>,
    config: Arc<BotConfig>,
    validator: WebAppValidator,
    trade_service: TradeService,
}

impl WebAppDataHandler {
    /// Factory registered under `webapp_data`
    pub fn create(
        transport: Arc<dyn Transport>,
        config: Arc<BotConfig>,
    ) -> Result<Arc<dyn Handler>> {
        Ok(Arc::new(Self::new(transport, config)))
    }

    pub fn new(transport: Arc<dyn Transport>, config: Arc<BotConfig>) -> Self {
        let validator = WebAppValidator::new(config.bot_token.clone());
        let trade_service = TradeService::new()
            .with_max_trade_amount(config.max_trade_amount)
            .with_trading_halted(config.trading_halted);
        Self {
            transport,
            config,
            validator,
            trade_service,
        }
    }

    async fn process(&self, update: &Update, chat_id: i64) -> Result<()> {
        let raw = update
            .web_app_data()
            .ok_or_else(|| BotError::Validation("update carries no web app data".to_string()))?;
        let envelope: WebAppEnvelope = serde_json::from_str(&raw.data)?;

        if !self.validator.validate_web_app_data(&envelope.init_data) {
            return Err(BotError::Validation(ERROR_INVALID_DATA.to_string()));
        }

        match envelope.kind.as_deref() {
            Some(TYPE_TRADE) => self.handle_trade(update, chat_id, &envelope.fields).await,
            Some(TYPE_ERROR) => self.handle_app_error(update, chat_id, &envelope.fields).await,
            other => {
                debug!(kind = ?other, "Unknown web app data type");
                self.reply(chat_id, UNKNOWN_WEB_APP_DATA).await
            }
        }
    }

    async fn handle_trade(
        &self,
        update: &Update,
        chat_id: i64,
        fields: &Map<String, Value>,
    ) -> Result<()> {
        let user_id = self.user_info(update).id;

        let outcome = TradeOrder::try_from(fields)
            .map_err(|invalid| {
                BotError::Validation(format!("Invalid trade data: {}", invalid.errors.join(", ")))
            })
            .and_then(|order| {
                self.trade_service
                    .process_trade(&order, user_id)
                    .map_err(BotError::from)
            });

        match outcome {
            Ok(receipt) => {
                debug!(user_id, trade_id = %receipt.trade_id, "Trade confirmed");
                self.reply(chat_id, &receipt.message).await
            }
            Err(err) => {
                let data = Value::Object(fields.clone());
                error!(
                    error = %err,
                    user_id,
                    data = %data,
                    "Trade handling error"
                );
                self.reply(chat_id, ERROR_TRADE_PROCESSING).await
            }
        }
    }

    async fn handle_app_error(
        &self,
        update: &Update,
        chat_id: i64,
        fields: &Map<String, Value>,
    ) -> Result<()> {
        let message = fields
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let data = Value::Object(fields.clone());
        error!(
            app_message = message,
            user_id = self.user_info(update).id,
            data = %data,
            "Web app error"
        );
        self.reply(chat_id, &web_app_error(message)).await
    }

    async fn reply(&self, chat_id: i64, text: &str) -> Result<()> {
        self.transport
            .send_message(chat_id, OutgoingMessage::text(text))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl Handler for WebAppDataHandler {
    fn family(&self) -> HandlerFamily {
        HandlerFamily::Action
    }

    fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Bound to the web app data channel whatever the identifier
    fn bind(&self, _trigger: Trigger) -> Result<Binding> {
        Ok(Binding::WebAppData)
    }

    async fn handle(&self, update: &Update) -> Result<()> {
        let chat_id = update.reply_chat_id()?;

        if let Err(err) = self.process(update, chat_id).await {
            error!(
                error = %err,
                user_id = self.user_info(update).id,
                web_app_data = ?update.web_app_data(),
                web_app_url = %self.config.web_app_url,
                web_app_host_url = %self.config.web_app_host_url,
                "Web app data error"
            );
            self.reply(chat_id, ERROR_WEB_APP).await?;
        }
        Ok(())
    }
}
