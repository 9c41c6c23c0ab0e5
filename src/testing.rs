//! Test support: stub providers, tools, and hooks.
//!
//! Provides:
//! - [`StaticProvider`]: returns a fixed text response on every call
//! - [`ScriptedProvider`]: plays back a queue of responses, then errors
//! - [`FlakyTool`]: fails a set number of times before succeeding
//! - [`RecordingHook`]: appends every lifecycle point it sees to a shared log
//!
//! Use these in tests instead of creating ad-hoc stub implementations.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;

use crate::error::{ProviderError, Result, ToolError};
use crate::hooks::{Hook, HookContext, Next};
use crate::llm::{Message, ModelProvider, ProviderResponse, ToolDefinition};
use crate::tools::{Tool, ToolOutput};

/// A provider stub that returns the same text response on every call.
///
/// Supports call counting via [`calls()`](Self::calls) and runtime failure
/// toggling via [`set_failing()`](Self::set_failing).
pub struct StaticProvider {
    response: String,
    call_count: AtomicU32,
    should_fail: AtomicBool,
}

impl StaticProvider {
    /// Create a stub that returns the given text.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            call_count: AtomicU32::new(0),
            should_fail: AtomicBool::new(false),
        }
    }

    /// The number of times `complete` was called.
    pub fn calls(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Toggle whether calls should fail at runtime.
    pub fn set_failing(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::Relaxed);
    }
}

impl Default for StaticProvider {
    fn default() -> Self {
        Self::new("OK")
    }
}

#[async_trait]
impl ModelProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn complete(
        &self,
        _messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if self.should_fail.load(Ordering::Relaxed) {
            return Err(ProviderError::RequestFailed {
                provider: "static".to_string(),
                reason: "server error".to_string(),
            });
        }
        Ok(ProviderResponse::Text(self.response.clone()))
    }
}

/// A provider stub that plays back a scripted sequence of responses.
///
/// Each `complete` call consumes the next response; once the script is
/// empty further calls fail with [`ProviderError::Exhausted`]. Useful for
/// multi-round runs where the model first requests tools and then answers.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<ProviderResponse>>,
    call_count: AtomicU32,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            call_count: AtomicU32::new(0),
        }
    }

    /// The number of times `complete` was called.
    pub fn calls(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        _messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.script
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .ok_or_else(|| ProviderError::Exhausted {
                provider: "scripted".to_string(),
            })
    }
}

/// A tool that fails a configured number of times before succeeding.
pub struct FlakyTool {
    name: String,
    failures: u32,
    attempts: AtomicU32,
}

impl FlakyTool {
    /// Create a tool that fails `failures` times, then returns "recovered".
    pub fn new(name: impl Into<String>, failures: u32) -> Self {
        Self {
            name: name.into(),
            failures,
            attempts: AtomicU32::new(0),
        }
    }

    /// The total number of execution attempts so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Tool for FlakyTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Fails a set number of times, then succeeds"
    }

    async fn execute(&self, _params: serde_json::Value) -> std::result::Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed);
        if attempt < self.failures {
            return Err(ToolError::ExecutionFailed {
                name: self.name.clone(),
                reason: format!("transient failure {}", attempt + 1),
            });
        }
        Ok(ToolOutput::text("recovered", start.elapsed()))
    }
}

/// A hook that appends `"{name}:{point}"` to a shared log at every
/// lifecycle point, passing all values through unchanged.
pub struct RecordingHook {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingHook {
    pub fn new(name: impl Into<String>, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.into(),
            log,
        }
    }

    fn record(&self, point: &str) {
        self.log
            .lock()
            .expect("log lock poisoned")
            .push(format!("{}:{}", self.name, point));
    }
}

#[async_trait]
impl Hook for RecordingHook {
    fn name(&self) -> &str {
        &self.name
    }

    async fn before_agent(&self, input: String, _ctx: &HookContext) -> Result<String> {
        self.record("before_agent");
        Ok(input)
    }

    async fn before_model(&self, messages: Vec<Message>, _ctx: &HookContext) -> Result<Vec<Message>> {
        self.record("before_model");
        Ok(messages)
    }

    async fn wrap_model_call(
        &self,
        _ctx: &HookContext,
        next: &dyn Next<ProviderResponse>,
    ) -> Result<ProviderResponse> {
        self.record("wrap_model_call");
        next.run().await
    }

    async fn after_model(
        &self,
        _response: &ProviderResponse,
        _ctx: &HookContext,
    ) -> Result<crate::hooks::ControlAction> {
        self.record("after_model");
        Ok(crate::hooks::ControlAction::Continue)
    }

    async fn wrap_tool_call(
        &self,
        tool: &str,
        _ctx: &HookContext,
        next: &dyn Next<ToolOutput>,
    ) -> Result<ToolOutput> {
        self.record(&format!("wrap_tool_call({tool})"));
        next.run().await
    }

    async fn after_agent(&self, output: String, _ctx: &HookContext) -> Result<String> {
        self.record("after_agent");
        Ok(output)
    }
}
