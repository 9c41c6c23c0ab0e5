//! Lifecycle hooks for intercepting and transforming agent runs.
//!
//! The hook system provides 6 well-defined interception points:
//!
//! - **before_agent** — Transform user input before a run starts
//! - **before_model** — Transform the conversation before each model call
//! - **wrap_model_call** — Wrap model invocations (retry, cache, fallback)
//! - **after_model** — Inspect each response and continue, reject, or modify
//! - **wrap_tool_call** — Wrap tool invocations
//! - **after_agent** — Transform the final output before it is returned
//!
//! Hooks run in registration order. For the simple points the first
//! registered hook runs first and feeds its result to the next. For the
//! wrapping points the first registered hook is the outermost layer around
//! the real operation, so its code runs first on the way in and last on the
//! way out.

pub mod builtin;
pub mod chain;
pub mod hook;
pub mod registry;

pub use builtin::{LoggingHook, PolicyHook, RetryHook};
pub use chain::{Next, run_model_chain, run_tool_chain};
pub use hook::{ControlAction, Hook, HookContext};
pub use registry::HookRegistry;
