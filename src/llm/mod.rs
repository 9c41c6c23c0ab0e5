//! Model provider boundary.
//!
//! The agent core depends only on the shapes defined here being stable and
//! `Send`-safe: a [`Message`] (role + content), a tagged [`ProviderResponse`]
//! (text or tool-call requests), and the [`ModelProvider`] trait as the
//! terminal model operation. Network clients, streaming, and provider-side
//! retry policies live in implementations, not in this crate.

mod provider;

pub use provider::{Message, ModelProvider, ProviderResponse, Role, ToolCall, ToolDefinition};
