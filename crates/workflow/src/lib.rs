//! Workflow engine: the dual-input scheduler.
//!
//! Two independent sources start conversational turns:
//! - **Terminal**: complete lines typed by the operator
//! - **Button**: the rising edge of the physical push button
//!
//! Both are polled once per tick, terminal first, and funnel into a single
//! [`TurnExecutor`]; one turn always runs to completion before the next
//! trigger is looked at.

pub mod edge;
pub mod input;
pub mod scheduler;

pub use edge::ButtonEdgeState;
pub use input::{LinePoll, LineSource, TerminalInput};
pub use scheduler::{ExitReason, Scheduler, SchedulerState, Trigger, TurnExecutor, is_exit_keyword};
