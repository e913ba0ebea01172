//! Bot configuration
//!
//! Loaded once at startup from the environment (or built explicitly in
//! tests) and shared read-only with every handler.

use crate::error::config_error;
use bot_core::{BotError, Result};
use bot_utils::{Environment, LogLevel, LoggingConfig, env_string, parse_var, require_var};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_SUPPORT_URL: &str = "https://champion.trade/support";
pub const DEFAULT_LEARN_MORE_URL: &str = "https://champion.trade/";
pub const DEFAULT_WELCOME_PHOTO_URL: &str = "https://imgur.com/pezy5zb";
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the Champion Trade bot
#[derive(Clone, PartialEq)]
pub struct BotConfig {
    /// Bot API token
    pub bot_token: String,

    /// Public web app URL shown in the welcome message
    pub web_app_url: String,

    /// URL the web app buttons open
    pub web_app_host_url: String,

    /// Support center link
    pub support_url: String,

    /// Marketing site link
    pub learn_more_url: String,

    /// Photo attached to the welcome message
    pub welcome_photo_url: String,

    /// Deployment environment
    pub environment: Environment,

    /// Log verbosity
    pub log_level: LogLevel,

    /// Long poll timeout for `getUpdates`
    pub poll_timeout: Duration,

    /// Largest accepted trade amount, unlimited when unset
    pub max_trade_amount: Option<f64>,

    /// Reject every trade while set
    pub trading_halted: bool,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"<redacted>")
            .field("web_app_url", &self.web_app_url)
            .field("web_app_host_url", &self.web_app_host_url)
            .field("support_url", &self.support_url)
            .field("learn_more_url", &self.learn_more_url)
            .field("welcome_photo_url", &self.welcome_photo_url)
            .field("environment", &self.environment)
            .field("log_level", &self.log_level)
            .field("poll_timeout", &self.poll_timeout)
            .field("max_trade_amount", &self.max_trade_amount)
            .field("trading_halted", &self.trading_halted)
            .finish()
    }
}

impl BotConfig {
    /// Create a new configuration builder
    pub fn builder() -> BotConfigBuilder {
        BotConfigBuilder::default()
    }

    /// Load from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&env_string)
    }

    /// Load from an arbitrary variable source
    ///
    /// Reads `BOT_TOKEN`, `WEBAPP_URL`, `WEBAPP_HOST_URL` (required) and the
    /// optional `SUPPORT_URL`, `LEARN_MORE_URL`, `WELCOME_PHOTO_URL`,
    /// `APP_ENV`/`NODE_ENV`, `LOG_LEVEL`, `POLL_TIMEOUT`, `MAX_TRADE_AMOUNT`
    /// and `TRADING_HALTED`.
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let logging = LoggingConfig::from_lookup(lookup).map_err(config_error)?;

        let mut builder = Self::builder()
            .bot_token(require_var(lookup, "BOT_TOKEN").map_err(config_error)?)
            .web_app_url(require_var(lookup, "WEBAPP_URL").map_err(config_error)?)
            .web_app_host_url(require_var(lookup, "WEBAPP_HOST_URL").map_err(config_error)?)
            .environment(logging.environment)
            .log_level(logging.level)
            .trading_halted(
                parse_var::<bool, _>(lookup, "TRADING_HALTED")
                    .map_err(config_error)?
                    .unwrap_or(false),
            );

        if let Some(url) = lookup("SUPPORT_URL") {
            builder = builder.support_url(url);
        }
        if let Some(url) = lookup("LEARN_MORE_URL") {
            builder = builder.learn_more_url(url);
        }
        if let Some(url) = lookup("WELCOME_PHOTO_URL") {
            builder = builder.welcome_photo_url(url);
        }
        if let Some(secs) = parse_var::<u64, _>(lookup, "POLL_TIMEOUT").map_err(config_error)? {
            builder = builder.poll_timeout(Duration::from_secs(secs));
        }
        let max_trade_amount =
            parse_var::<f64, _>(lookup, "MAX_TRADE_AMOUNT").map_err(config_error)?;
        if let Some(limit) = max_trade_amount {
            builder = builder.max_trade_amount(limit);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            return Err(BotError::Config("bot_token is required".to_string()));
        }

        for (name, url) in [
            ("WEBAPP_URL", &self.web_app_url),
            ("WEBAPP_HOST_URL", &self.web_app_host_url),
        ] {
            if !url.starts_with("https://") {
                return Err(BotError::Config(format!(
                    "{name} must start with https://, got '{url}'"
                )));
            }
        }

        if let Some(limit) = self.max_trade_amount {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(BotError::Config(
                    "max_trade_amount must be a positive number".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Subscriber settings derived from this configuration
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig::for_environment(self.environment).with_level(self.log_level)
    }
}

/// Builder for BotConfig
#[derive(Debug, Default)]
pub struct BotConfigBuilder {
    bot_token: Option<String>,
    web_app_url: Option<String>,
    web_app_host_url: Option<String>,
    support_url: Option<String>,
    learn_more_url: Option<String>,
    welcome_photo_url: Option<String>,
    environment: Option<Environment>,
    log_level: Option<LogLevel>,
    poll_timeout: Option<Duration>,
    max_trade_amount: Option<f64>,
    trading_halted: bool,
}

impl BotConfigBuilder {
    pub fn bot_token(mut self, token: impl Into<String>) -> Self {
        self.bot_token = Some(token.into());
        self
    }

    pub fn web_app_url(mut self, url: impl Into<String>) -> Self {
        self.web_app_url = Some(url.into());
        self
    }

    pub fn web_app_host_url(mut self, url: impl Into<String>) -> Self {
        self.web_app_host_url = Some(url.into());
        self
    }

    pub fn support_url(mut self, url: impl Into<String>) -> Self {
        self.support_url = Some(url.into());
        self
    }

    pub fn learn_more_url(mut self, url: impl Into<String>) -> Self {
        self.learn_more_url = Some(url.into());
        self
    }

    pub fn welcome_photo_url(mut self, url: impl Into<String>) -> Self {
        self.welcome_photo_url = Some(url.into());
        self
    }

    /// Set the environment; the log level defaults from it
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = Some(timeout);
        self
    }

    pub fn max_trade_amount(mut self, limit: f64) -> Self {
        self.max_trade_amount = Some(limit);
        self
    }

    pub fn trading_halted(mut self, halted: bool) -> Self {
        self.trading_halted = halted;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<BotConfig> {
        let environment = self.environment.unwrap_or_default();

        let config = BotConfig {
            bot_token: self
                .bot_token
                .ok_or_else(|| BotError::Config("bot_token is required".to_string()))?,
            web_app_url: self
                .web_app_url
                .ok_or_else(|| BotError::Config("web_app_url is required".to_string()))?,
            web_app_host_url: self
                .web_app_host_url
                .ok_or_else(|| BotError::Config("web_app_host_url is required".to_string()))?,
            support_url: self
                .support_url
                .unwrap_or_else(|| DEFAULT_SUPPORT_URL.to_string()),
            learn_more_url: self
                .learn_more_url
                .unwrap_or_else(|| DEFAULT_LEARN_MORE_URL.to_string()),
            welcome_photo_url: self
                .welcome_photo_url
                .unwrap_or_else(|| DEFAULT_WELCOME_PHOTO_URL.to_string()),
            environment,
            log_level: self
                .log_level
                .unwrap_or_else(|| LogLevel::for_environment(environment)),
            poll_timeout: self.poll_timeout.unwrap_or(DEFAULT_POLL_TIMEOUT),
            max_trade_amount: self.max_trade_amount,
            trading_halted: self.trading_halted,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> BotConfig {
    BotConfig::builder()
        .bot_token("123456:TEST-TOKEN")
        .web_app_url("https://t.me/champion_bot/app")
        .web_app_host_url("https://app.champion.trade")
        .build()
        .unwrap()
}
