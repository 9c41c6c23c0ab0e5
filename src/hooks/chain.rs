//! Wrapping-hook composition.
//!
//! Composes N wrapping hooks and one terminal async operation into a single
//! call. The chain is built right-to-left: starting from the terminal
//! operation, each hook from last-registered to first-registered wraps the
//! layers inside it, so the first-registered hook ends up outermost: it
//! begins execution first and observes the final result last, the classic
//! onion ordering of HTTP middleware stacks.
//!
//! The executor is pure composition. It introduces no error variants of its
//! own and invokes each hook at most once per chain run; retry, fallback,
//! and short-circuiting are decisions individual hooks make through the
//! continuation they are handed.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::Result;
use crate::hooks::hook::{Hook, HookContext};
use crate::llm::ProviderResponse;
use crate::tools::ToolOutput;

/// The rest of a wrapping chain: every hook registered after the current
/// one, ending in the terminal operation.
///
/// `run` takes `&self`, so a wrapping hook may invoke it never (a valid
/// short-circuit), once (the passthrough default), or repeatedly (retry).
#[async_trait]
pub trait Next<T>: Send + Sync {
    /// Invoke the remainder of the chain once and return its result.
    async fn run(&self) -> Result<T>;
}

/// Innermost layer: the terminal operation itself.
struct Terminal<'a, T> {
    op: Box<dyn Fn() -> BoxFuture<'a, Result<T>> + Send + Sync + 'a>,
}

#[async_trait]
impl<'a, T: Send + 'static> Next<T> for Terminal<'a, T> {
    async fn run(&self) -> Result<T> {
        (self.op)().await
    }
}

/// One model-call hook plus everything registered after it.
struct ModelLayer<'a> {
    hook: &'a Arc<dyn Hook>,
    ctx: &'a HookContext,
    inner: Box<dyn Next<ProviderResponse> + 'a>,
}

#[async_trait]
impl<'a> Next<ProviderResponse> for ModelLayer<'a> {
    async fn run(&self) -> Result<ProviderResponse> {
        self.hook.wrap_model_call(self.ctx, &*self.inner).await
    }
}

/// One tool-call hook plus everything registered after it. Carries the
/// tool's name so every layer can make per-tool decisions.
struct ToolLayer<'a> {
    hook: &'a Arc<dyn Hook>,
    tool: &'a str,
    ctx: &'a HookContext,
    inner: Box<dyn Next<ToolOutput> + 'a>,
}

#[async_trait]
impl<'a> Next<ToolOutput> for ToolLayer<'a> {
    async fn run(&self) -> Result<ToolOutput> {
        self.hook
            .wrap_tool_call(self.tool, self.ctx, &*self.inner)
            .await
    }
}

/// Compose `hooks` around a terminal model call and run the result.
///
/// With zero hooks the operation is invoked directly; the chain adds no
/// boxing and no allocation beyond what the operation itself does.
pub async fn run_model_chain<'a, F, Fut>(
    hooks: &'a [Arc<dyn Hook>],
    ctx: &'a HookContext,
    op: F,
) -> Result<ProviderResponse>
where
    F: Fn() -> Fut + Send + Sync + 'a,
    Fut: Future<Output = Result<ProviderResponse>> + Send + 'a,
{
    if hooks.is_empty() {
        return op().await;
    }

    let mut chain: Box<dyn Next<ProviderResponse> + 'a> = Box::new(Terminal {
        op: Box::new(move || -> BoxFuture<'a, Result<ProviderResponse>> { Box::pin(op()) }),
    });
    for hook in hooks.iter().rev() {
        chain = Box::new(ModelLayer {
            hook,
            ctx,
            inner: chain,
        });
    }
    chain.run().await
}

/// Compose `hooks` around a terminal tool call and run the result.
///
/// Identical composition to [`run_model_chain`], with `tool` threaded
/// through to every layer.
pub async fn run_tool_chain<'a, F, Fut>(
    hooks: &'a [Arc<dyn Hook>],
    tool: &'a str,
    ctx: &'a HookContext,
    op: F,
) -> Result<ToolOutput>
where
    F: Fn() -> Fut + Send + Sync + 'a,
    Fut: Future<Output = Result<ToolOutput>> + Send + 'a,
{
    if hooks.is_empty() {
        return op().await;
    }

    let mut chain: Box<dyn Next<ToolOutput> + 'a> = Box::new(Terminal {
        op: Box::new(move || -> BoxFuture<'a, Result<ToolOutput>> { Box::pin(op()) }),
    });
    for hook in hooks.iter().rev() {
        chain = Box::new(ToolLayer {
            hook,
            tool,
            ctx,
            inner: chain,
        });
    }
    chain.run().await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::error::{Error, ToolError};

    /// Records "{name}-before" / "{name}-after" around its continuation.
    struct MarkerHook {
        label: String,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl MarkerHook {
        fn new(label: &str, log: Arc<Mutex<Vec<String>>>) -> Arc<dyn Hook> {
            Arc::new(Self {
                label: label.to_string(),
                log,
            })
        }

        fn push(&self, suffix: &str) {
            self.log
                .lock()
                .expect("marker log poisoned")
                .push(format!("{}-{}", self.label, suffix));
        }
    }

    #[async_trait]
    impl Hook for MarkerHook {
        fn name(&self) -> &str {
            &self.label
        }

        async fn wrap_model_call(
            &self,
            _ctx: &HookContext,
            next: &dyn Next<ProviderResponse>,
        ) -> Result<ProviderResponse> {
            self.push("before");
            let result = next.run().await;
            self.push("after");
            result
        }

        async fn wrap_tool_call(
            &self,
            _tool: &str,
            _ctx: &HookContext,
            next: &dyn Next<ToolOutput>,
        ) -> Result<ToolOutput> {
            self.push("before");
            let result = next.run().await;
            self.push("after");
            result
        }
    }

    /// Never invokes its continuation; answers from its own value.
    struct ShortCircuitHook;

    #[async_trait]
    impl Hook for ShortCircuitHook {
        fn name(&self) -> &str {
            "short_circuit"
        }

        async fn wrap_model_call(
            &self,
            _ctx: &HookContext,
            _next: &dyn Next<ProviderResponse>,
        ) -> Result<ProviderResponse> {
            Ok(ProviderResponse::text("cached"))
        }
    }

    /// Retries the continuation once on failure.
    struct RetryOnceHook;

    #[async_trait]
    impl Hook for RetryOnceHook {
        fn name(&self) -> &str {
            "retry_once"
        }

        async fn wrap_tool_call(
            &self,
            _tool: &str,
            _ctx: &HookContext,
            next: &dyn Next<ToolOutput>,
        ) -> Result<ToolOutput> {
            match next.run().await {
                Ok(output) => Ok(output),
                Err(_) => next.run().await,
            }
        }
    }

    /// Records the tool name each wrap layer was handed.
    struct ToolNameProbe {
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Hook for ToolNameProbe {
        fn name(&self) -> &str {
            "tool_name_probe"
        }

        async fn wrap_tool_call(
            &self,
            tool: &str,
            _ctx: &HookContext,
            next: &dyn Next<ToolOutput>,
        ) -> Result<ToolOutput> {
            self.seen
                .lock()
                .expect("probe log poisoned")
                .push(tool.to_string());
            next.run().await
        }
    }

    #[tokio::test]
    async fn zero_hooks_invokes_terminal_directly() {
        let hooks: Vec<Arc<dyn Hook>> = Vec::new();
        let ctx = HookContext::new("test");
        let calls = AtomicUsize::new(0);

        let calls_ref = &calls;
        let response = run_model_chain(&hooks, &ctx, move || async move {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            Ok(ProviderResponse::text("direct"))
        })
        .await
        .expect("terminal should succeed");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.as_text(), Some("direct"));
    }

    #[tokio::test]
    async fn first_registered_hook_is_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let hooks = vec![
            MarkerHook::new("H1", Arc::clone(&log)),
            MarkerHook::new("H2", Arc::clone(&log)),
        ];
        let ctx = HookContext::new("test");

        let term_log = Arc::clone(&log);
        run_model_chain(&hooks, &ctx, move || {
            let term_log = Arc::clone(&term_log);
            async move {
                term_log
                    .lock()
                    .expect("marker log poisoned")
                    .push("terminal".to_string());
                Ok(ProviderResponse::text("OK"))
            }
        })
        .await
        .expect("chain should succeed");

        let markers = log.lock().expect("marker log poisoned").clone();
        assert_eq!(
            markers,
            vec!["H1-before", "H2-before", "terminal", "H2-after", "H1-after"]
        );
    }

    #[tokio::test]
    async fn tool_chain_orders_like_model_chain() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let hooks = vec![
            MarkerHook::new("H1", Arc::clone(&log)),
            MarkerHook::new("H2", Arc::clone(&log)),
        ];
        let ctx = HookContext::new("test");

        let term_log = Arc::clone(&log);
        run_tool_chain(&hooks, "echo", &ctx, move || {
            let term_log = Arc::clone(&term_log);
            async move {
                term_log
                    .lock()
                    .expect("marker log poisoned")
                    .push("terminal".to_string());
                Ok(ToolOutput::text("pong", Duration::ZERO))
            }
        })
        .await
        .expect("chain should succeed");

        let markers = log.lock().expect("marker log poisoned").clone();
        assert_eq!(
            markers,
            vec!["H1-before", "H2-before", "terminal", "H2-after", "H1-after"]
        );
    }

    #[tokio::test]
    async fn hook_may_skip_its_continuation() {
        let hooks: Vec<Arc<dyn Hook>> = vec![Arc::new(ShortCircuitHook)];
        let ctx = HookContext::new("test");
        let calls = AtomicUsize::new(0);

        let calls_ref = &calls;
        let response = run_model_chain(&hooks, &ctx, move || async move {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            Ok(ProviderResponse::text("from provider"))
        })
        .await
        .expect("short circuit should succeed");

        // The terminal operation never ran; the hook answered for it.
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(response.as_text(), Some("cached"));
    }

    #[tokio::test]
    async fn hook_may_invoke_its_continuation_twice() {
        let hooks: Vec<Arc<dyn Hook>> = vec![Arc::new(RetryOnceHook)];
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
                Ok(ToolOutput::text("recovered", Duration::ZERO))
            }
        })
        .await
        .expect("retry should recover");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(output.render(), "recovered");
    }

    #[tokio::test]
    async fn tool_name_reaches_every_layer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let hooks: Vec<Arc<dyn Hook>> = vec![
            Arc::new(ToolNameProbe {
                seen: Arc::clone(&seen),
            }),
            Arc::new(ToolNameProbe {
                seen: Arc::clone(&seen),
            }),
        ];
        let ctx = HookContext::new("test");

        run_tool_chain(&hooks, "clock", &ctx, || async {
            Ok(ToolOutput::text("now", Duration::ZERO))
        })
        .await
        .expect("chain should succeed");

        let names = seen.lock().expect("probe log poisoned").clone();
        assert_eq!(names, vec!["clock", "clock"]);
    }

    #[tokio::test]
    async fn errors_pass_through_unconverted() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let hooks = vec![MarkerHook::new("H1", Arc::clone(&log))];
        let ctx = HookContext::new("test");

        let err = run_model_chain(&hooks, &ctx, || async {
            Err(Error::hook("imposter", "provider exploded"))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Hook { .. }));
        // The wrapping hook still observed the failure on the way out.
        let markers = log.lock().expect("marker log poisoned").clone();
        assert_eq!(markers, vec!["H1-before", "H1-after"]);
    }

    #[tokio::test]
    async fn default_wrap_is_passthrough() {
        struct NamedOnly;
        impl Hook for NamedOnly {
            fn name(&self) -> &str {
                "named_only"
            }
        }

        let hooks: Vec<Arc<dyn Hook>> = vec![Arc::new(NamedOnly)];
        let ctx = HookContext::new("test");

        let response = run_model_chain(&hooks, &ctx, || async {
            Ok(ProviderResponse::text("untouched"))
        })
        .await
        .expect("default wrap should pass through");

        assert_eq!(response.as_text(), Some("untouched"));
    }
}
