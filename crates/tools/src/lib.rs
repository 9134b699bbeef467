//! The capabilities the model may call.
//!
//! Three tools, declared to the model in this order:
//! - `read_environment_data`: sensor snapshot plus button level
//! - `set_led_state`: switch one LED on or off
//! - `get_led_status`: current state of every LED
//!
//! Each tool holds a clone of the [`Board`]; the registry is built once at
//! startup and never changes afterwards.

pub mod environment;
pub mod leds;

pub use environment::ReadEnvironmentTool;
pub use leds::{GetLedStatusTool, SetLedStateTool};

use climactl_core::hardware::Board;
use climactl_core::tool::ToolRegistry;

/// Create the registry with every built-in capability bound to `board`.
pub fn default_registry(board: &Board) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ReadEnvironmentTool::new(board.clone())));
    registry.register(Box::new(SetLedStateTool::new(board.clone())));
    registry.register(Box::new(GetLedStatusTool::new(board.clone())));
    registry
}
