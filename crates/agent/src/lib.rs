//! The conversational core of climactl.
//!
//! One turn runs through three pieces:
//!
//! 1. **Session** appends the user message to the history
//! 2. **InferenceDriver** sends the history to the model; when the model
//!    asks for tools, runs them in order, appends each result and asks the
//!    model exactly once more
//! 3. **Session** appends the final reply, caps the history and captures a
//!    **StatusReport**
//!
//! There is a single tool round per turn, so a model that keeps asking for
//! tools costs at most two backend requests.

pub mod loop_runner;
pub mod session;
pub mod status;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use loop_runner::InferenceDriver;
pub use session::{Session, TurnReport};
pub use status::StatusReport;
