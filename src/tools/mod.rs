//! Tool execution boundary.
//!
//! Tools are the agent's interface to the outside world. This crate keeps
//! the boundary minimal: a [`Tool`] trait as the terminal operation that
//! `wrap_tool_call` chains compose around, a name-keyed [`ToolRegistry`],
//! and a couple of built-ins for exercising the loop. Sandboxing, approval
//! flows, and remote tool protocols belong to the embedding application.

pub mod builtin;

mod registry;
mod tool;

pub use registry::ToolRegistry;
pub use tool::{Tool, ToolOutput, require_str};
