//! Core agent logic.
//!
//! The agent orchestrates:
//! - Conversation assembly and the model/tool round loop
//! - Lifecycle hook invocation at all six interception points
//! - Tool dispatch through the wrapping chain
//!
//! Construction goes through [`AgentBuilder`]; a built agent is immutable
//! and serves concurrent runs without locking.

mod runner;

pub use runner::{Agent, AgentBuilder};
