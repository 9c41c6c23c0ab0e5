//! The agent execution loop.
//!
//! `Agent::run` drives one request through the six lifecycle points:
//!
//! ```text
//! input -> before_agent -> [ before_model -> wrap_model_call(model)
//!       -> after_model -> wrap_tool_call(tool)* ]* -> after_agent -> output
//! ```
//!
//! The bracketed section repeats once per tool round until the model
//! returns a final text answer or `max_tool_rounds` is exhausted.

use std::sync::Arc;

use crate::config::AgentConfig;
use crate::error::{AgentError, Error, Result};
use crate::hooks::{Hook, HookContext, HookRegistry, run_model_chain, run_tool_chain};
use crate::llm::{Message, ModelProvider, ProviderResponse};
use crate::tools::{Tool, ToolRegistry};

/// An agent: one model provider, a frozen tool registry, and a frozen
/// hook registry. Runs are independent; `run` takes `&self`.
pub struct Agent {
    name: String,
    system_prompt: Option<String>,
    max_tool_rounds: u32,
    provider: Arc<dyn ModelProvider>,
    tools: ToolRegistry,
    hooks: HookRegistry,
}

/// Builder for [`Agent`]. Hook registration order is execution order and
/// cannot be changed after `build()`.
pub struct AgentBuilder {
    config: AgentConfig,
    provider: Arc<dyn ModelProvider>,
    tools: ToolRegistry,
    hooks: HookRegistry,
}

impl AgentBuilder {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            config: AgentConfig::default(),
            provider,
            tools: ToolRegistry::new(),
            hooks: HookRegistry::new(),
        }
    }

    /// Apply agent configuration (name, system prompt, round limit).
    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a tool. Lookup is by name; registration order is
    /// irrelevant here, unlike hooks.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.register(tool);
        self
    }

    /// Register the built-in tools (echo, clock).
    pub fn with_builtin_tools(mut self) -> Self {
        self.tools.register_builtins();
        self
    }

    /// Append a lifecycle hook. The first registered hook runs first at
    /// the simple points and outermost at the wrapping points.
    pub fn with_lifecycle(mut self, hook: Arc<dyn Hook>) -> Self {
        self.hooks.register(hook);
        self
    }

    /// Freeze the registries and produce the agent.
    pub fn build(self) -> Agent {
        Agent {
            name: self.config.name,
            system_prompt: self.config.system_prompt,
            max_tool_rounds: self.config.max_tool_rounds,
            provider: self.provider,
            tools: self.tools,
            hooks: self.hooks,
        }
    }
}

impl Agent {
    /// Process one input through the full lifecycle and return the final
    /// text answer.
    ///
    /// A `ControlAction::Reject` from any `after_model` hook aborts the
    /// run with `Error::Rejected`. Tool failures do not abort: they are
    /// fed back to the model as error-text tool results and the
    /// conversation continues.
    pub async fn run(&self, input: impl Into<String>) -> Result<String> {
        let ctx = HookContext::new(&self.name);
        let hooks = self.hooks.hooks();
        tracing::debug!(run_id = %ctx.run_id, agent = %self.name, "Starting agent run");

        let input = self.hooks.before_agent(input.into(), &ctx).await?;

        let mut messages = Vec::new();
        if let Some(prompt) = &self.system_prompt {
            messages.push(Message::system(prompt));
        }
        messages.push(Message::user(input));

        let definitions = self.tools.definitions();

        let mut rounds = 0u32;
        let output = loop {
            if rounds >= self.max_tool_rounds {
                return Err(AgentError::ToolRoundsExceeded {
                    max: self.max_tool_rounds as usize,
                }
                .into());
            }
            rounds += 1;

            messages = self.hooks.before_model(messages, &ctx).await?;

            let response = {
                let provider = self.provider.as_ref();
                let msgs = &messages;
                let defs = &definitions;
                run_model_chain(hooks, &ctx, move || async move {
                    provider.complete(msgs, defs).await.map_err(Error::from)
                })
                .await?
            };

            let response = self.hooks.after_model(response, &ctx).await?;

            match response {
                ProviderResponse::Text(text) => break text,
                ProviderResponse::ToolCalls { calls, content } => {
                    if calls.is_empty() {
                        break content.unwrap_or_default();
                    }
                    tracing::debug!(
                        run_id = %ctx.run_id,
                        count = calls.len(),
                        "Model requested tool calls"
                    );
                    messages.push(Message::assistant_with_tool_calls(content, calls.clone()));

                    for call in calls {
                        let result = {
                            let tools = &self.tools;
                            let call_ref = &call;
                            run_tool_chain(hooks, &call.name, &ctx, move || async move {
                                tools.execute(call_ref).await.map_err(Error::from)
                            })
                            .await
                        };

                        match result {
                            Ok(output) => {
                                messages.push(Message::tool_result(
                                    &call.id,
                                    &call.name,
                                    output.render(),
                                ));
                            }
                            Err(e) => {
                                tracing::warn!(tool = %call.name, error = %e, "Tool call failed");
                                messages.push(Message::tool_result(
                                    &call.id,
                                    &call.name,
                                    format!("Tool call failed: {}", e),
                                ));
                            }
                        }
                    }
                }
            }
        };

        let output = self.hooks.after_agent(output, &ctx).await?;
        tracing::debug!(
            run_id = %ctx.run_id,
            rounds,
            elapsed_ms = ctx.elapsed().num_milliseconds(),
            "Agent run finished"
        );
        Ok(output)
    }

    /// The agent's configured name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
