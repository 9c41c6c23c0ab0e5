//! Core hook types and the hook contract.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::hooks::chain::Next;
use crate::llm::{Message, ProviderResponse};
use crate::tools::ToolOutput;

/// Per-run context passed to every hook invocation.
///
/// A read-only snapshot taken when the run starts. Hooks that need mutable
/// state across invocations must carry and synchronize it themselves; the
/// runtime guarantees ordering, not exclusivity.
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Unique id for this agent run.
    pub run_id: Uuid,
    /// Name of the agent executing the run.
    pub agent: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Arbitrary metadata hooks can read.
    pub metadata: HashMap<String, String>,
}

impl HookContext {
    /// Create a context for a fresh run.
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            agent: agent.into(),
            started_at: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Time elapsed since the run started.
    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }
}

/// The outcome an `after_model` hook returns.
///
/// This is the only hook point that produces a control action; every other
/// point is a passthrough transformer returning a possibly-modified value
/// of the type it received.
#[derive(Debug, Clone)]
pub enum ControlAction {
    /// Proceed with the unmodified downstream value.
    Continue,
    /// Abort the current agent run with an explicit error.
    Reject {
        /// Human-readable reason, surfaced to the caller verbatim.
        reason: String,
    },
    /// Replace the response that all downstream processing will see,
    /// including any `after_model` hooks registered later.
    Modify { response: ProviderResponse },
}

impl ControlAction {
    /// Shorthand for `Reject { reason }`.
    pub fn reject(reason: impl Into<String>) -> Self {
        ControlAction::Reject {
            reason: reason.into(),
        }
    }

    /// Shorthand for `Modify { response }`.
    pub fn modify(response: ProviderResponse) -> Self {
        ControlAction::Modify { response }
    }
}

/// Trait for implementing lifecycle hooks.
///
/// All six operations default to behavior-preserving passthroughs, so an
/// implementor overrides only the points it cares about and an agent with
/// zero registered hooks behaves identically to one with no hook
/// infrastructure at all.
///
/// Implementations may perform arbitrary I/O; failures propagate to the
/// caller unchanged through the crate [`Result`]. The default bodies never
/// fail.
#[async_trait]
pub trait Hook: Send + Sync {
    /// A name for this hook, used in logs and error messages only;
    /// execution order is determined solely by registration order.
    fn name(&self) -> &str;

    /// Transform the raw input before the run starts.
    async fn before_agent(&self, input: String, _ctx: &HookContext) -> Result<String> {
        Ok(input)
    }

    /// Transform the conversation before each model call.
    async fn before_model(&self, messages: Vec<Message>, _ctx: &HookContext) -> Result<Vec<Message>> {
        Ok(messages)
    }

    /// Wrap the model call.
    ///
    /// `next` is the rest of the chain: every hook registered after this
    /// one, ending in the actual provider call. The hook decides whether,
    /// when, and how many times to invoke it. Calling it repeatedly
    /// implements retry; returning without calling it at all is a valid
    /// short-circuit (a cache hit, a circuit breaker). The runtime does
    /// not detect or penalize non-invocation.
    async fn wrap_model_call(
        &self,
        _ctx: &HookContext,
        next: &dyn Next<ProviderResponse>,
    ) -> Result<ProviderResponse> {
        next.run().await
    }

    /// Inspect the model response and decide how the run proceeds.
    ///
    /// The only hook point that returns a [`ControlAction`]. Hooks run in
    /// registration order; a `Modify` replaces the response seen by every
    /// later hook and by all downstream processing, a `Reject` stops the
    /// run immediately.
    async fn after_model(
        &self,
        _response: &ProviderResponse,
        _ctx: &HookContext,
    ) -> Result<ControlAction> {
        Ok(ControlAction::Continue)
    }

    /// Wrap a single tool call.
    ///
    /// Identical composition to [`wrap_model_call`](Hook::wrap_model_call);
    /// `tool` carries the tool's name through every layer so hooks can make
    /// per-tool decisions (skip retry for a non-idempotent tool, say).
    /// Non-invocation of `next` is permitted here too.
    async fn wrap_tool_call(
        &self,
        _tool: &str,
        _ctx: &HookContext,
        next: &dyn Next<ToolOutput>,
    ) -> Result<ToolOutput> {
        next.run().await
    }

    /// Transform the final result after the run completes.
    async fn after_agent(&self, output: String, _ctx: &HookContext) -> Result<String> {
        Ok(output)
    }
}
