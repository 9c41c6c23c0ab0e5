//! Clock tool reporting the current time.

use async_trait::async_trait;
use chrono::Utc;

use crate::error::ToolError;
use crate::tools::tool::{Tool, ToolOutput};

/// Tool for getting the current UTC time.
pub struct ClockTool;

#[async_trait]
impl Tool for ClockTool {
    fn name(&self) -> &str {
        "clock"
    }

    fn description(&self) -> &str {
        "Get the current UTC date and time."
    }

    async fn execute(&self, _params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();

        let now = Utc::now();
        let result = serde_json::json!({
            "iso8601": now.to_rfc3339(),
            "unix": now.timestamp(),
        });

        Ok(ToolOutput::success(result, start.elapsed()))
    }
}
