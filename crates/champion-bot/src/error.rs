//! Error types for trade processing

use bot_core::BotError;
use thiserror::Error;

/// Business rule rejections raised by the trade service
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TradeError {
    /// Trading is halted
    #[error("Trading is currently closed")]
    TradingClosed,

    /// The order exceeds the configured size limit
    #[error("Trade size exceeds limits: {amount} > {limit}")]
    SizeLimitExceeded { amount: f64, limit: f64 },

    /// The order failed structural validation
    #[error("Invalid trade data: {0}")]
    InvalidData(String),
}

/// Result type alias for trade operations
pub type Result<T> = std::result::Result<T, TradeError>;

/// Convert TradeError to BotError
impl From<TradeError> for BotError {
    fn from(err: TradeError) -> Self {
        BotError::Validation(err.to_string())
    }
}

/// Convert a configuration error from the environment layer
pub(crate) fn config_error(err: bot_utils::ConfigError) -> BotError {
    BotError::Config(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_error_messages() {
        assert_eq!(TradeError::TradingClosed.to_string(), "Trading is currently closed");
        assert_eq!(
            TradeError::SizeLimitExceeded {
                amount: 150.0,
                limit: 100.0
            }
            .to_string(),
            "Trade size exceeds limits: 150 > 100"
        );
    }

    #[test]
    fn test_into_bot_error() {
        let err: BotError = TradeError::TradingClosed.into();
        assert!(matches!(err, BotError::Validation(_)));
        assert!(!err.is_programming_error());
    }
}
