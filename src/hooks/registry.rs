//! Ordered registry of lifecycle hooks.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::hooks::hook::{ControlAction, Hook, HookContext};
use crate::llm::{Message, ProviderResponse};

/// The ordered set of hooks attached to an agent.
///
/// Registration is append-only and happens during agent construction; the
/// registry is frozen behind an `Arc` once the agent is built. Insertion
/// order is the execution order everywhere: left-to-right for the value
/// transformers applied here, outermost-first for the wrapping chains in
/// [`chain`](crate::hooks::chain).
#[derive(Default)]
pub struct HookRegistry {
    hooks: Vec<Arc<dyn Hook>>,
}

impl HookRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Append a hook. Cannot fail; order of calls is order of execution.
    pub fn register(&mut self, hook: Arc<dyn Hook>) {
        tracing::debug!(hook = %hook.name(), "Registered lifecycle hook");
        self.hooks.push(hook);
    }

    /// The registered hooks, in registration order.
    pub fn hooks(&self) -> &[Arc<dyn Hook>] {
        &self.hooks
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Apply every `before_agent` hook in order, feeding each hook's output
    /// to the next.
    pub async fn before_agent(&self, input: String, ctx: &HookContext) -> Result<String> {
        let mut current = input;
        for hook in &self.hooks {
            current = hook.before_agent(current, ctx).await?;
        }
        Ok(current)
    }

    /// Apply every `before_model` hook in order.
    pub async fn before_model(
        &self,
        messages: Vec<Message>,
        ctx: &HookContext,
    ) -> Result<Vec<Message>> {
        let mut current = messages;
        for hook in &self.hooks {
            current = hook.before_model(current, ctx).await?;
        }
        Ok(current)
    }

    /// Evaluate every `after_model` hook in order and interpret the
    /// control actions.
    ///
    /// `Continue` moves on to the next hook. `Modify` replaces the working
    /// response, so later hooks see the modified value, never the original.
    /// `Reject` stops evaluation immediately and fails the run with the
    /// hook's reason.
    pub async fn after_model(
        &self,
        response: ProviderResponse,
        ctx: &HookContext,
    ) -> Result<ProviderResponse> {
        let mut current = response;
        for hook in &self.hooks {
            match hook.after_model(&current, ctx).await? {
                ControlAction::Continue => {}
                ControlAction::Reject { reason } => {
                    tracing::warn!(hook = %hook.name(), %reason, "Hook rejected model response");
                    return Err(Error::Rejected { reason });
                }
                ControlAction::Modify { response } => {
                    tracing::debug!(hook = %hook.name(), "Hook modified model response");
                    current = response;
                }
            }
        }
        Ok(current)
    }

    /// Apply every `after_agent` hook in order.
    pub async fn after_agent(&self, output: String, ctx: &HookContext) -> Result<String> {
        let mut current = output;
        for hook in &self.hooks {
            current = hook.after_agent(current, ctx).await?;
        }
        Ok(current)
    }
}
