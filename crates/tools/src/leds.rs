//! LED tools: `set_led_state` and `get_led_status`.

use async_trait::async_trait;
use climactl_core::error::ToolError;
use climactl_core::hardware::{Board, LedColor, LedState};
use climactl_core::tool::{Tool, ToolResult};
use serde::Deserialize;
use tracing::info;

/// Arguments of `set_led_state`, before value validation.
#[derive(Debug, Deserialize)]
struct SetLedArgs {
    color: String,
    state: String,
}

pub struct SetLedStateTool {
    board: Board,
}

impl SetLedStateTool {
    pub fn new(board: Board) -> Self {
        Self { board }
    }
}

#[async_trait]
impl Tool for SetLedStateTool {
    fn name(&self) -> &str {
        "set_led_state"
    }

    fn description(&self) -> &str {
        "Turns a specific LED on or off (red, yellow, green) to simulate actuator control (fan/heater)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "color": {
                    "type": "string",
                    "enum": LedColor::ALL.map(|c| c.as_str()),
                    "description": "The color of the LED."
                },
                "state": {
                    "type": "string",
                    "enum": [LedState::On.as_str(), LedState::Off.as_str()],
                    "description": "The desired state."
                }
            },
            "required": ["color", "state"]
        })
    }

    /// Missing arguments are a `ToolError`; a color or state outside the
    /// allowed values is an `Error: ...` string the model can read.
    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: SetLedArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        match self.board.set_actuator(&args.color, &args.state) {
            Ok(confirmation) => {
                info!(color = %args.color, state = %args.state, "LED switched");
                Ok(ToolResult::ok(self.name(), serde_json::json!(confirmation)))
            }
            Err(e) => Ok(ToolResult::failure(
                self.name(),
                serde_json::json!(format!("Error: {e}.")),
            )),
        }
    }
}

pub struct GetLedStatusTool {
    board: Board,
}

impl GetLedStatusTool {
    pub fn new(board: Board) -> Self {
        Self { board }
    }
}

#[async_trait]
impl Tool for GetLedStatusTool {
    fn name(&self) -> &str {
        "get_led_status"
    }

    fn description(&self) -> &str {
        "Returns the current state (on/off) of all LEDs."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let payload =
            serde_json::to_value(self.board.led_status()).map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;
        Ok(ToolResult::ok(self.name(), payload))
    }
}
