//! Logging and tracing utilities

use crate::config::{ConfigError, Environment};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log verbosity, from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    /// Logging disabled
    None,
}

impl LogLevel {
    /// Default level for an environment
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Production => LogLevel::Warn,
            Environment::Staging => LogLevel::Info,
            Environment::Development => LogLevel::Debug,
        }
    }

    /// Directive understood by `EnvFilter`
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::None => "off",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "NONE" => Ok(LogLevel::None),
            _ => Err(ConfigError::Invalid {
                key: "LOG_LEVEL".to_string(),
                reason: format!("Invalid log level: {s}"),
            }),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::None => "NONE",
        };
        write!(f, "{name}")
    }
}

/// Subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub environment: Environment,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl LoggingConfig {
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            level: LogLevel::for_environment(environment),
            environment,
            json: false,
        }
    }

    /// Read `LOG_LEVEL` and `APP_ENV`/`NODE_ENV`
    ///
    /// An unrecognised `LOG_LEVEL` falls back to the environment default.
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::from_lookup(lookup)?;
        let mut config = Self::for_environment(environment);
        if let Some(level) = lookup("LOG_LEVEL").and_then(|l| l.parse().ok()) {
            config.level = level;
        }
        Ok(config)
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// `RUST_LOG` wins over the configured level
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_directive()))
    }
}

/// Initialize the global tracing subscriber
///
/// Fails when a subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(config.filter());

    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()?;
    }

    tracing::debug!(
        level = %config.level,
        environment = %config.environment,
        json = config.json,
        "Tracing initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults() {
        assert_eq!(LogLevel::for_environment(Environment::Production), LogLevel::Warn);
        assert_eq!(LogLevel::for_environment(Environment::Staging), LogLevel::Info);
        assert_eq!(LogLevel::for_environment(Environment::Development), LogLevel::Debug);
        assert_eq!(LoggingConfig::default().level, LogLevel::Warn);
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("NONE".parse::<LogLevel>(), Ok(LogLevel::None));
        assert!("verbose".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::None.as_directive(), "off");
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Error < LogLevel::None);
    }

    #[test]
    fn test_from_lookup() {
        let vars = |key: &str| match key {
            "NODE_ENV" => Some("staging".to_string()),
            "LOG_LEVEL" => Some("error".to_string()),
            _ => None,
        };
        let config = LoggingConfig::from_lookup(&vars).unwrap();
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.level, LogLevel::Error);

        let unknown_level = |key: &str| (key == "LOG_LEVEL").then(|| "LOUD".to_string());
        let config = LoggingConfig::from_lookup(&unknown_level).unwrap();
        assert_eq!(config.level, LogLevel::Warn);
    }

    #[test]
    fn test_builder_overrides() {
        let config = LoggingConfig::for_environment(Environment::Staging)
            .with_level(LogLevel::Error)
            .with_json(true);
        assert_eq!(config.level, LogLevel::Error);
        assert_eq!(config.environment, Environment::Staging);
        assert!(config.json);
    }
}
