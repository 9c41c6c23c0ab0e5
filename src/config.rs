//! Configuration for hookline.
//!
//! Settings are loaded with priority: env var > default. Every key has a
//! default, so `Config::from_env()` succeeds in an empty environment.

use std::time::Duration;

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub agent: AgentConfig,
    pub retry: RetryConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            agent: AgentConfig::resolve()?,
            retry: RetryConfig::resolve()?,
        })
    }
}

/// Agent behavior configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Agent name, recorded in run contexts and logs.
    pub name: String,
    /// System prompt prepended to every conversation.
    pub system_prompt: Option<String>,
    /// Maximum model/tool rounds per run before giving up.
    pub max_tool_rounds: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "agent".to_string(),
            system_prompt: None,
            max_tool_rounds: 8,
        }
    }
}

impl AgentConfig {
    fn resolve() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_tool_rounds =
            parse_optional_env("AGENT_MAX_TOOL_ROUNDS", defaults.max_tool_rounds)?;
        if max_tool_rounds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "AGENT_MAX_TOOL_ROUNDS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            name: optional_env("AGENT_NAME")?.unwrap_or(defaults.name),
            system_prompt: optional_env("AGENT_SYSTEM_PROMPT")?,
            max_tool_rounds,
        })
    }
}

/// Tool retry configuration, consumed by `RetryHook`.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts per tool call (1 initial + N-1 retries).
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds, doubled each attempt.
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

impl RetryConfig {
    fn resolve() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_attempts = parse_optional_env("RETRY_MAX_ATTEMPTS", defaults.max_attempts)?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RETRY_MAX_ATTEMPTS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            max_attempts,
            base_delay_ms: parse_optional_env("RETRY_BASE_DELAY_MS", defaults.base_delay_ms)?,
        })
    }

    /// The base delay as a `Duration`.
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

// Helper functions

fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(val) if val.is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::ParseError(format!(
            "failed to read {key}: {e}"
        ))),
    }
}

fn parse_optional_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)?
        .map(|s| {
            s.parse().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{e}"),
            })
        })
        .transpose()
        .map(|opt| opt.unwrap_or(default))
}
