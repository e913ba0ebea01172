//! Environment model and helpers for reading configuration from env vars

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    /// A variable is set but cannot be used
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    #[default]
    Production,
}

impl Environment {
    pub const ALL: [Environment; 3] = [
        Environment::Development,
        Environment::Staging,
        Environment::Production,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Read `APP_ENV`, falling back to `NODE_ENV`, then production
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup("APP_ENV").or_else(|| lookup("NODE_ENV")) {
            Some(value) => value.parse(),
            None => Ok(Environment::default()),
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Environment::ALL
            .into_iter()
            .find(|env| env.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::Invalid {
                key: "env".to_string(),
                reason: format!("must be one of [development, staging, production], got {s}"),
            })
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Value of a process environment variable, treating empty as unset
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Value of a required variable
pub fn require_var<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

/// Parse an optional variable
pub fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| ConfigError::Invalid {
                key: key.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!("production".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("Staging".parse::<Environment>(), Ok(Environment::Staging));
        assert_eq!(" development ".parse::<Environment>(), Ok(Environment::Development));
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn test_default_environment_is_production() {
        assert_eq!(Environment::default(), Environment::Production);
    }

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn test_environment_lookup_order() {
        let both = lookup(&[("APP_ENV", "staging"), ("NODE_ENV", "development")]);
        assert_eq!(Environment::from_lookup(&both), Ok(Environment::Staging));

        let node_only = lookup(&[("NODE_ENV", "development")]);
        assert_eq!(Environment::from_lookup(&node_only), Ok(Environment::Development));

        assert_eq!(Environment::from_lookup(&lookup(&[])), Ok(Environment::Production));
        assert!(Environment::from_lookup(&lookup(&[("APP_ENV", "qa")])).is_err());
    }

    #[test]
    fn test_require_and_parse() {
        let vars = lookup(&[("BOT_TOKEN", "abc"), ("POLL_TIMEOUT", "45"), ("BAD", "x")]);

        assert_eq!(require_var(&vars, "BOT_TOKEN"), Ok("abc".to_string()));
        assert_eq!(
            require_var(&vars, "WEBAPP_URL").unwrap_err().to_string(),
            "Missing required environment variable: WEBAPP_URL"
        );
        assert_eq!(parse_var::<u64, _>(&vars, "POLL_TIMEOUT"), Ok(Some(45)));
        assert_eq!(parse_var::<u64, _>(&vars, "UNSET"), Ok(None));
        assert!(matches!(
            parse_var::<u64, _>(&vars, "BAD"),
            Err(ConfigError::Invalid { key, .. }) if key == "BAD"
        ));
    }
}
