//! Error types for bot-core

use crate::handler::HandlerFamily;
use thiserror::Error;

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, BotError>;

/// Error type shared by handlers, registries and transports
#[derive(Error, Debug)]
pub enum BotError {
    /// A handler was dispatched without overriding `handle`
    #[error("{family} handler must implement handle method")]
    Unimplemented { family: HandlerFamily },

    /// A trigger could not be bound for its handler family
    #[error("Invalid trigger '{trigger}': {reason}")]
    InvalidTrigger { trigger: String, reason: String },

    /// Inbound data was rejected
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Sending to or acknowledging on the platform failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Template rendering error
    #[error("Template error: {0}")]
    Template(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl BotError {
    /// Whether the error is a programming mistake rather than a runtime condition
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            BotError::Unimplemented { .. } | BotError::InvalidTrigger { .. }
        )
    }

    /// Messages of this error and every error in its source chain
    pub fn chain(&self) -> Vec<String> {
        let mut messages = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            messages.push(err.to_string());
            source = err.source();
        }
        messages
    }
}

/// Convert anyhow::Error to BotError
impl From<anyhow::Error> for BotError {
    fn from(err: anyhow::Error) -> Self {
        BotError::Other(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unimplemented_names_family() {
        let err = BotError::Unimplemented {
            family: HandlerFamily::Command,
        };
        assert_eq!(err.to_string(), "Command handler must implement handle method");

        let err = BotError::Unimplemented {
            family: HandlerFamily::Action,
        };
        assert_eq!(err.to_string(), "Action handler must implement handle method");
        assert!(err.is_programming_error());
    }

    #[test]
    fn test_error_chain_includes_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = BotError::from(json_err);
        let chain = err.chain();
        assert!(chain[0].starts_with("JSON error:"));
        assert!(!err.is_programming_error());
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: BotError = anyhow::anyhow!("boom").context("while sending").into();
        assert_eq!(err.to_string(), "while sending: boom");
    }
}
