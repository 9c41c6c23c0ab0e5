//! hookline: lifecycle hooks and middleware chaining for agent loops
//!
//! Six well-defined interception points around an agent's model/tool loop,
//! with onion-style composition for the wrapping points.
//!
//! # Architecture
//!
//! ```text
//!                 input
//!                   │
//!            before_agent (fold, registration order)
//!                   │
//!   ┌──── round ────┼─────────────────────────────────────┐
//!   │        before_model (fold)                          │
//!   │               │                                     │
//!   │        wrap_model_call chain                        │
//!   │        H1 ▶ H2 ▶ ... ▶ model                        │
//!   │               │                                     │
//!   │        after_model (Continue / Reject / Modify)     │
//!   │               │                                     │
//!   │        wrap_tool_call chain, per requested tool     │
//!   │        H1 ▶ H2 ▶ ... ▶ tool                         │
//!   └───────────────┼─────────────────────────────────────┘
//!                   │
//!            after_agent (fold)
//!                   │
//!                 output
//! ```
//!
//! # Features
//!
//! - **Six lifecycle points** - transform input/output, rewrite the
//!   conversation, wrap model and tool calls, screen responses
//! - **Onion composition** - first registered hook is outermost; wrapping
//!   hooks hold a continuation they may skip, call once, or call repeatedly
//! - **Control actions** - `after_model` hooks continue, reject (abort the
//!   run), or substitute the response all downstream stages see
//! - **Zero-cost when unused** - an agent with no hooks calls the model and
//!   tools directly, with no boxing or indirection on the path
//! - **Built-in hooks** - logging, tool retry with jittered backoff, and
//!   content policy, all written against the public contract

pub mod agent;
pub mod config;
pub mod error;
pub mod hooks;
pub mod llm;
pub mod logging;
pub mod testing;
pub mod tools;

pub use config::Config;
pub use error::{Error, Result};

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::agent::{Agent, AgentBuilder};
    pub use crate::config::{AgentConfig, Config, RetryConfig};
    pub use crate::error::{Error, Result};
    pub use crate::hooks::{ControlAction, Hook, HookContext, HookRegistry, Next};
    pub use crate::llm::{Message, ModelProvider, ProviderResponse, Role, ToolCall};
    pub use crate::tools::{Tool, ToolOutput, ToolRegistry};
}
