//! Error types for hookline.

use std::time::Duration;

/// Top-level error type for the agent runtime.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An `after_model` hook rejected the response. The reason is surfaced
    /// to the caller verbatim as the run's failure message.
    #[error("{reason}")]
    Rejected { reason: String },

    /// A hook's own logic failed (I/O, policy lookup). Propagated through
    /// the chain unchanged.
    #[error("hook {hook} failed: {message}")]
    Hook { hook: String, message: String },

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Build a rejection from an `after_model` control action.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Build a hook failure, tagged with the hook's name.
    pub fn hook(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Hook {
            hook: hook.into(),
            message: message.into(),
        }
    }
}

/// Model provider errors.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Provider {provider} has no responses left")]
    Exhausted { provider: String },
}

/// Tool execution errors.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool {name} not found")]
    NotFound { name: String },

    #[error("Tool {name} execution failed: {reason}")]
    ExecutionFailed { name: String, reason: String },

    #[error("Invalid parameters for tool {name}: {reason}")]
    InvalidParameters { name: String, reason: String },
}

/// Agent-loop errors.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Exceeded {max} tool rounds without a final answer")]
    ToolRoundsExceeded { max: usize },
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}

/// Result type alias for the agent runtime.
pub type Result<T> = std::result::Result<T, Error>;
