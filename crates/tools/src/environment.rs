//! Environment read tool.
//!
//! A failed read is not an error at this boundary: the model gets an
//! `{"error": ...}` object and can tell the user the sensors are down.

use async_trait::async_trait;
use climactl_core::error::ToolError;
use climactl_core::hardware::Board;
use climactl_core::tool::{Tool, ToolResult};

pub struct ReadEnvironmentTool {
    board: Board,
}

impl ReadEnvironmentTool {
    pub fn new(board: Board) -> Self {
        Self { board }
    }
}

#[async_trait]
impl Tool for ReadEnvironmentTool {
    fn name(&self) -> &str {
        "read_environment_data"
    }

    fn description(&self) -> &str {
        "Reads temperature, humidity, pressure, and button state."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let reading = match self.board.read_environment() {
            Ok(reading) => reading,
            Err(e) => return Ok(ToolResult::error(self.name(), e.to_string())),
        };

        let payload = serde_json::to_value(reading).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().into(),
            reason: e.to_string(),
        })?;
        Ok(ToolResult::ok(self.name(), payload))
    }
}
