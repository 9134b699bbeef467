//! Tool trait: the abstraction over capabilities the model may invoke.
//!
//! Tools are what give the assistant the ability to act on the board:
//! read the sensors, switch the LEDs, report LED state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::message::ToolRequest;
use crate::provider::ToolDefinition;

/// The result of one capability invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The capability that produced this result
    pub name: String,

    /// Whether the capability accepted the request
    pub success: bool,

    /// JSON payload handed back to the model
    pub payload: serde_json::Value,
}

impl ToolResult {
    pub fn ok(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            success: true,
            payload,
        }
    }

    pub fn failure(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            success: false,
            payload,
        }
    }

    /// Structured `{"error": ...}` result.
    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::failure(name, serde_json::json!({ "error": message.into() }))
    }

    /// The tool message content: the payload encoded as JSON text.
    pub fn content(&self) -> String {
        self.payload.to_string()
    }
}

/// The core Tool trait.
///
/// Each capability implements this trait and is registered once at startup.
/// Argument validation happens inside `execute`; a rejected argument is
/// either an `Err(ToolError::InvalidArguments)` or a failure result.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "set_led_state").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// The capability registry.
///
/// Populated at startup, then shared read-only (typically behind an `Arc`).
/// The inference driver uses it to:
/// 1. Get tool definitions to send to the model, in registration order
/// 2. Invoke capabilities when the model requests them
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(idx) => self.tools[idx] = tool,
            None => self.tools.push(tool),
        }
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }

    /// Get all tool definitions (for sending to the model).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// Invoke the capability named by `request`.
    ///
    /// Never fails: an unknown name or a rejected argument comes back as a
    /// failure result so the model can see it and react.
    pub async fn invoke(&self, request: &ToolRequest) -> ToolResult {
        let Some(tool) = self.get(&request.name) else {
            warn!(tool = %request.name, "Model requested an unknown tool");
            return ToolResult::error(
                &request.name,
                format!("Error: {}.", ToolError::NotFound(request.name.clone())),
            );
        };

        let start = Instant::now();
        let outcome = tool
            .execute(serde_json::Value::Object(request.arguments.clone()))
            .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => {
                debug!(tool = %request.name, success = result.success, duration_ms, "Tool executed");
                result
            }
            Err(e) => {
                warn!(tool = %request.name, error = %e, duration_ms, "Tool rejected request");
                ToolResult::error(&request.name, e.to_string())
            }
        }
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
