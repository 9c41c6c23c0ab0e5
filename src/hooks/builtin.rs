//! Built-in hooks.
//!
//! Policy layers on top of the policy-free chain: observation, retry, and
//! content policy. Each uses only the public [`Hook`] contract, so they
//! double as reference implementations for hook authors.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;

use crate::config::RetryConfig;
use crate::error::{Error, Result, ToolError};
use crate::hooks::chain::Next;
use crate::hooks::hook::{ControlAction, Hook, HookContext};
use crate::llm::{Message, ProviderResponse};
use crate::tools::ToolOutput;

/// Logs every lifecycle point through `tracing`.
///
/// Pure observation: values pass through unchanged and the continuation is
/// invoked exactly once.
pub struct LoggingHook;

#[async_trait]
impl Hook for LoggingHook {
    fn name(&self) -> &str {
        "logging"
    }

    async fn before_agent(&self, input: String, ctx: &HookContext) -> Result<String> {
        tracing::debug!(run_id = %ctx.run_id, chars = input.len(), "Run started");
        Ok(input)
    }

    async fn before_model(&self, messages: Vec<Message>, _ctx: &HookContext) -> Result<Vec<Message>> {
        tracing::debug!(messages = messages.len(), "Sending conversation to model");
        Ok(messages)
    }

    async fn wrap_model_call(
        &self,
        _ctx: &HookContext,
        next: &dyn Next<ProviderResponse>,
    ) -> Result<ProviderResponse> {
        let start = Instant::now();
        let result = next.run().await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => tracing::info!(elapsed_ms, "Model call completed"),
            Err(err) => tracing::warn!(elapsed_ms, error = %err, "Model call failed"),
        }
        result
    }

    async fn wrap_tool_call(
        &self,
        tool: &str,
        _ctx: &HookContext,
        next: &dyn Next<ToolOutput>,
    ) -> Result<ToolOutput> {
        let start = Instant::now();
        let result = next.run().await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => tracing::info!(tool, elapsed_ms, "Tool call completed"),
            Err(err) => tracing::warn!(tool, elapsed_ms, error = %err, "Tool call failed"),
        }
        result
    }

    async fn after_agent(&self, output: String, ctx: &HookContext) -> Result<String> {
        tracing::debug!(
            run_id = %ctx.run_id,
            elapsed_ms = ctx.elapsed().num_milliseconds(),
            chars = output.len(),
            "Run finished"
        );
        Ok(output)
    }
}

/// Retries failed tool calls with exponential backoff and jitter.
///
/// Demonstrates invoking a continuation more than once. Tools on the skip
/// list and deterministic failures (unknown tool, invalid parameters) are
/// never retried.
pub struct RetryHook {
    max_attempts: u32,
    base_delay: Duration,
    skip: HashSet<String>,
}

impl RetryHook {
    /// Retry up to `max_attempts` total invocations, starting from a
    /// 1 second base delay.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_secs(1),
            skip: HashSet::new(),
        }
    }

    /// Build from the environment-derived retry section.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts).with_base_delay(config.base_delay())
    }

    /// Set the base backoff delay.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Exempt a tool from retry, regardless of how it fails.
    pub fn skip_tool(mut self, name: impl Into<String>) -> Self {
        self.skip.insert(name.into());
        self
    }

    fn is_retryable(err: &Error) -> bool {
        !matches!(
            err,
            Error::Tool(ToolError::NotFound { .. } | ToolError::InvalidParameters { .. })
        )
    }
}

#[async_trait]
impl Hook for RetryHook {
    fn name(&self) -> &str {
        "retry"
    }

    async fn wrap_tool_call(
        &self,
        tool: &str,
        _ctx: &HookContext,
        next: &dyn Next<ToolOutput>,
    ) -> Result<ToolOutput> {
        if self.skip.contains(tool) {
            return next.run().await;
        }

        let mut attempt = 0u32;
        loop {
            match next.run().await {
                Ok(output) => return Ok(output),
                Err(err) if attempt + 1 < self.max_attempts && Self::is_retryable(&err) => {
                    let delay = backoff_delay(self.base_delay, attempt);
                    tracing::warn!(
                        tool,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Tool call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Calculate exponential backoff delay with random jitter.
///
/// The base delay doubles each attempt, with +/-25% jitter.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let base_ms = (base.as_millis() as u64).saturating_mul(2u64.saturating_pow(attempt));
    let jitter_range = base_ms / 4; // 25%
    let jitter = if jitter_range > 0 {
        let offset = rand::thread_rng().gen_range(0..=jitter_range * 2);
        offset as i64 - jitter_range as i64
    } else {
        0
    };
    let delay_ms = (base_ms as i64 + jitter).max(1) as u64;
    Duration::from_millis(delay_ms)
}

/// Screens text responses against a denied-pattern list.
///
/// In rejecting mode a match aborts the run; in redacting mode matches are
/// replaced and downstream processing sees the redacted response. Tool-call
/// responses pass through unscreened.
pub struct PolicyHook {
    patterns: Vec<String>,
    action: PolicyAction,
}

enum PolicyAction {
    Reject,
    Redact,
}

impl PolicyHook {
    /// Reject any text response containing one of `patterns`.
    pub fn rejecting(patterns: Vec<String>) -> Self {
        Self {
            patterns,
            action: PolicyAction::Reject,
        }
    }

    /// Replace occurrences of `patterns` in text responses with
    /// `[redacted]`.
    pub fn redacting(patterns: Vec<String>) -> Self {
        Self {
            patterns,
            action: PolicyAction::Redact,
        }
    }
}

#[async_trait]
impl Hook for PolicyHook {
    fn name(&self) -> &str {
        "policy"
    }

    async fn after_model(
        &self,
        response: &ProviderResponse,
        _ctx: &HookContext,
    ) -> Result<ControlAction> {
        let Some(text) = response.as_text() else {
            return Ok(ControlAction::Continue);
        };

        match self.action {
            PolicyAction::Reject => {
                for pattern in &self.patterns {
                    if text.contains(pattern.as_str()) {
                        return Ok(ControlAction::reject(format!(
                            "response matched denied pattern '{}'",
                            pattern
                        )));
                    }
                }
                Ok(ControlAction::Continue)
            }
            PolicyAction::Redact => {
                let mut redacted = text.to_string();
                for pattern in &self.patterns {
                    redacted = redacted.replace(pattern.as_str(), "[redacted]");
                }
                if redacted == text {
                    Ok(ControlAction::Continue)
                } else {
                    Ok(ControlAction::modify(ProviderResponse::Text(redacted)))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::hooks::chain::run_tool_chain;

    fn fast_retry(max_attempts: u32) -> Arc<dyn Hook> {
        Arc::new(RetryHook::new(max_attempts).with_base_delay(Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn retry_recovers_from_transient_failure() {
        let hooks = vec![fast_retry(3)];
        let ctx = HookContext::new("test");
        let calls = AtomicUsize::new(0);

        let calls_ref = &calls;
        let output = run_tool_chain(&hooks, "echo", &ctx, move || async move {
            let n = calls_ref.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err(Error::Tool(ToolError::ExecutionFailed {
                    name: "echo".to_string(),
                    reason: "transient".to_string(),
                }))
            } else {
                Ok(ToolOutput::text("ok", Duration::ZERO))
            }
        })
        .await
        .expect("retry should recover");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(output.render(), "ok");
    }

    #[tokio::test]
    async fn retry_gives_up_after_max_attempts() {
        let hooks = vec![fast_retry(3)];
        let ctx = HookContext::new("test");
        let calls = AtomicUsize::new(0);

        let calls_ref = &calls;
        let err = run_tool_chain(&hooks, "echo", &ctx, move || async move {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            Err::<ToolOutput, _>(Error::Tool(ToolError::ExecutionFailed {
                name: "echo".to_string(),
                reason: "still down".to_string(),
            }))
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(err, Error::Tool(ToolError::ExecutionFailed { .. })));
    }

    #[tokio::test]
    async fn retry_skips_exempted_tools() {
        let hooks: Vec<Arc<dyn Hook>> = vec![Arc::new(
            RetryHook::new(3)
                .with_base_delay(Duration::from_millis(1))
                .skip_tool("clock"),
        )];
        let ctx = HookContext::new("test");
        let calls = AtomicUsize::new(0);

        let calls_ref = &calls;
        let err = run_tool_chain(&hooks, "clock", &ctx, move || async move {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            Err::<ToolOutput, _>(Error::Tool(ToolError::ExecutionFailed {
                name: "clock".to_string(),
                reason: "flaky".to_string(),
            }))
        })
        .await
        .unwrap_err();

        // No retry for the exempted tool: a single invocation, error as-is.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, Error::Tool(ToolError::ExecutionFailed { .. })));
    }

    #[tokio::test]
    async fn retry_never_repeats_deterministic_failures() {
        let hooks = vec![fast_retry(5)];
        let ctx = HookContext::new("test");
        let calls = AtomicUsize::new(0);

        let calls_ref = &calls;
        let err = run_tool_chain(&hooks, "missing", &ctx, move || async move {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            Err::<ToolOutput, _>(Error::Tool(ToolError::NotFound {
                name: "missing".to_string(),
            }))
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, Error::Tool(ToolError::NotFound { .. })));
    }

    #[test]
    fn backoff_delay_doubles_with_jitter() {
        // Run multiple samples to verify the range, accounting for jitter
        for _ in 0..20 {
            let base = Duration::from_millis(1000);
            let d0 = backoff_delay(base, 0);
            let d1 = backoff_delay(base, 1);

            // Attempt 0: base 1000ms, jitter +/-250ms -> [750, 1250]
            assert!(d0.as_millis() >= 750, "attempt 0 too low: {:?}", d0);
            assert!(d0.as_millis() <= 1250, "attempt 0 too high: {:?}", d0);

            // Attempt 1: base 2000ms, jitter +/-500ms -> [1500, 2500]
            assert!(d1.as_millis() >= 1500, "attempt 1 too low: {:?}", d1);
            assert!(d1.as_millis() <= 2500, "attempt 1 too high: {:?}", d1);
        }
    }

    #[test]
    fn backoff_delay_survives_large_attempt_numbers() {
        let delay = backoff_delay(Duration::from_millis(1000), 40);
        assert!(delay.as_millis() >= 1);
    }

    #[test]
    fn retry_hook_adopts_config_values() {
        let hook = RetryHook::from_config(&RetryConfig {
            max_attempts: 5,
            base_delay_ms: 250,
        });
        assert_eq!(hook.max_attempts, 5);
        assert_eq!(hook.base_delay, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn policy_rejects_matched_text() {
        let hook = PolicyHook::rejecting(vec!["rm -rf".to_string()]);
        let ctx = HookContext::new("test");
        let response = ProviderResponse::text("run rm -rf / to clean up");

        let action = hook
            .after_model(&response, &ctx)
            .await
            .expect("policy check never fails");
        match action {
            ControlAction::Reject { reason } => assert!(reason.contains("rm -rf")),
            other => panic!("expected Reject, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn policy_passes_clean_text() {
        let hook = PolicyHook::rejecting(vec!["rm -rf".to_string()]);
        let ctx = HookContext::new("test");
        let response = ProviderResponse::text("all good");

        let action = hook
            .after_model(&response, &ctx)
            .await
            .expect("policy check never fails");
        assert!(matches!(action, ControlAction::Continue));
    }

    #[tokio::test]
    async fn policy_redacts_instead_of_rejecting() {
        let hook = PolicyHook::redacting(vec!["hunter2".to_string()]);
        let ctx = HookContext::new("test");
        let response = ProviderResponse::text("the password is hunter2");

        let action = hook
            .after_model(&response, &ctx)
            .await
            .expect("policy check never fails");
        match action {
            ControlAction::Modify { response } => {
                assert_eq!(response.as_text(), Some("the password is [redacted]"));
            }
            other => panic!("expected Modify, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn policy_ignores_tool_call_responses() {
        let hook = PolicyHook::rejecting(vec!["anything".to_string()]);
        let ctx = HookContext::new("test");
        let response = ProviderResponse::ToolCalls {
            calls: vec![],
            content: Some("anything".to_string()),
        };

        let action = hook
            .after_model(&response, &ctx)
            .await
            .expect("policy check never fails");
        assert!(matches!(action, ControlAction::Continue));
    }

    #[tokio::test]
    async fn logging_hook_is_pure_passthrough() {
        let hook = LoggingHook;
        let ctx = HookContext::new("test");

        let input = hook
            .before_agent("hello".to_string(), &ctx)
            .await
            .expect("logging never fails");
        assert_eq!(input, "hello");

        let output = hook
            .after_agent("done".to_string(), &ctx)
            .await
            .expect("logging never fails");
        assert_eq!(output, "done");
    }
}
