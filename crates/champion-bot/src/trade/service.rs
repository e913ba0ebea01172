//! Trade service
//!
//! Applies business rules to a structurally valid order, records it for
//! audit and produces the confirmation shown to the user. Execution is a
//! placeholder; no order leaves the process.

use crate::error::{Result, TradeError};
use bot_webapp::{TradeAction, TradeOrder};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error};
use uuid::Uuid;

/// Execution state of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Executed,
}

/// Result of a processed trade
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeReceipt {
    pub trade_id: String,
    pub executed_at: DateTime<Utc>,
    pub status: TradeStatus,
    pub order: TradeOrder,
    /// Confirmation text for the user
    pub message: String,
}

/// Applies trade business rules
#[derive(Debug, Clone, Default)]
pub struct TradeService {
    max_trade_amount: Option<f64>,
    halted: bool,
}

impl TradeService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject orders above `limit`
    pub fn with_max_trade_amount(mut self, limit: Option<f64>) -> Self {
        self.max_trade_amount = limit;
        self
    }

    /// Reject every order while halted
    pub fn with_trading_halted(mut self, halted: bool) -> Self {
        self.halted = halted;
        self
    }

    /// Check, record and execute an order for `user_id`
    pub fn process_trade(&self, order: &TradeOrder, user_id: i64) -> Result<TradeReceipt> {
        if let Err(err) = self.check_order(order) {
            error!(
                error = %err,
                user_id,
                symbol = %order.symbol,
                amount = order.amount,
                action = %order.action,
                "Trade processing error"
            );
            return Err(err);
        }

        let executed_at = Utc::now();
        let trade_id = generate_trade_id(executed_at);

        debug!(
            user_id,
            trade_id = %trade_id,
            timestamp = %executed_at.to_rfc3339(),
            trading_hour_valid = self.is_trading_open(),
            trade_size_valid = self.is_valid_trade_size(order.amount),
            symbol = %order.symbol,
            amount = order.amount,
            action = %order.action,
            "Trade request"
        );

        Ok(TradeReceipt {
            message: format_trade_response(order),
            trade_id,
            executed_at,
            status: TradeStatus::Executed,
            order: order.clone(),
        })
    }

    fn check_order(&self, order: &TradeOrder) -> Result<()> {
        if !self.is_trading_open() {
            return Err(TradeError::TradingClosed);
        }
        if !self.is_valid_trade_size(order.amount) {
            return Err(TradeError::SizeLimitExceeded {
                amount: order.amount,
                limit: self.max_trade_amount.unwrap_or(f64::INFINITY),
            });
        }
        Ok(())
    }

    fn is_trading_open(&self) -> bool {
        !self.halted
    }

    fn is_valid_trade_size(&self, amount: f64) -> bool {
        self.max_trade_amount.is_none_or(|limit| amount <= limit)
    }
}

/// `T<unix millis>-<8 hex chars>`
fn generate_trade_id(at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("T{}-{}", at.timestamp_millis(), &suffix[..8])
}

/// Confirmation text for an executed order
pub fn format_trade_response(order: &TradeOrder) -> String {
    let emoji = match order.action {
        TradeAction::Buy => "🟢",
        TradeAction::Sell => "🔴",
    };

    format!(
        "{emoji} Trade Executed Successfully\n\n\
         Symbol: {}\n\
         Amount: {}\n\
         Action: {}\n\n\
         Status: Completed ✅",
        order.symbol, order.amount, order.action
    )
}
