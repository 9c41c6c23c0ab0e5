//! Echo tool for exercising tool execution.

use async_trait::async_trait;

use crate::error::ToolError;
use crate::tools::tool::{Tool, ToolOutput, require_str};

/// Simple echo tool. Pure function: same input always produces same output,
/// which makes it a safe target for retrying wrap hooks.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echoes back the input message. Useful for testing tool execution."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "The message to echo back"
                }
            },
            "required": ["message"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();

        let message = require_str(self.name(), &params, "message")?;

        Ok(ToolOutput::text(message, start.elapsed()))
    }
}
