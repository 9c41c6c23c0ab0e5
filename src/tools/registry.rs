//! Tool registry for managing available tools.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ToolError;
use crate::llm::{ToolCall, ToolDefinition};
use crate::tools::builtin::{ClockTool, EchoTool};
use crate::tools::tool::{Tool, ToolOutput};

/// Registry of available tools.
///
/// Populated during agent construction and read-only afterwards; lookup is
/// by name, so registration order carries no meaning here.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. A tool with the same name is replaced.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name.clone(), tool);
        tracing::debug!("Registered tool: {}", name);
    }

    /// Register all built-in tools.
    pub fn register_builtins(&mut self) {
        self.register(Arc::new(EchoTool));
        self.register(Arc::new(ClockTool));
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check if a tool exists.
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all tool names.
    pub fn list(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Get the number of registered tools.
    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// Get tool definitions for model function calling.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect()
    }

    /// Execute a tool call requested by the model.
    ///
    /// An unknown tool name is `ToolError::NotFound`; the agent loop records
    /// it as a tool-result message rather than aborting the run.
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolOutput, ToolError> {
        let tool = self.get(&call.name).ok_or_else(|| ToolError::NotFound {
            name: call.name.clone(),
        })?;
        tool.execute(call.arguments.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn executes_registered_tool_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register_builtins();

        let call = ToolCall {
            id: "call_1".to_string(),
            name: "echo".to_string(),
            arguments: serde_json::json!({"message": "ping"}),
        };
        let output = registry.execute(&call).await.expect("echo should succeed");
        assert_eq!(output.render(), "ping");
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let registry = ToolRegistry::new();
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "missing".to_string(),
            arguments: serde_json::json!({}),
        };
        let err = registry.execute(&call).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound { name } if name == "missing"));
    }

    #[test]
    fn definitions_expose_name_and_schema() {
        let mut registry = ToolRegistry::new();
        registry.register_builtins();

        let defs = registry.definitions();
        assert_eq!(defs.len(), 2);
        let echo = defs.iter().find(|d| d.name == "echo").expect("echo def");
        assert_eq!(echo.parameters["type"], "object");
    }
}
