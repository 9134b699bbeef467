//! # climactl Core
//!
//! Domain types, traits, and error definitions for the climactl assistant.
//! This crate has **no I/O of its own**: it defines the domain model that
//! the provider, hardware, tool and agent crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (model backend, sensors, actuators, button)
//! is a trait here. Implementations live in their respective crates, which
//! keeps the tool-calling loop testable with in-memory stand-ins.

pub mod error;
pub mod hardware;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use hardware::{Board, ButtonSignal, EnvironmentReading, LedColor, LedState, LedStatus};
pub use message::{Conversation, Message, Role, ToolRequest};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Timings, ToolDefinition};
pub use tool::{Tool, ToolRegistry, ToolResult};
