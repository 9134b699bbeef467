//! Provider trait: the abstraction over the model backend.
//!
//! A Provider knows how to send a conversation plus tool declarations to a
//! chat-completion backend and get one response message back, together with
//! the timing fields the backend reports.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;

/// One chat-completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "qwen2.5:1.5b")
    pub model: String,

    /// The full conversation, system preamble first
    pub messages: Vec<Message>,

    /// Tools the model may request
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Sampling temperature; backend default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A tool definition sent to the model so it knows what it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// A complete (non-streaming) response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated message, possibly carrying tool requests
    pub message: Message,

    /// Which model actually responded
    pub model: String,

    /// Latency and throughput counters reported by the backend
    #[serde(default)]
    pub timings: Timings,
}

/// Timing fields reported by the backend. Durations are in nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Timings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_duration: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_duration: Option<u64>,
}

impl Timings {
    /// Wall time of the request in seconds.
    pub fn total_seconds(&self) -> Option<f64> {
        self.total_duration.map(|ns| ns as f64 / 1e9)
    }

    /// Generation throughput: `eval_count / eval_duration`, in tokens per second.
    pub fn eval_rate(&self) -> Option<f64> {
        let count = self.eval_count?;
        match self.eval_duration {
            Some(ns) if ns > 0 => Some(count as f64 / (ns as f64 / 1e9)),
            _ => None,
        }
    }
}

/// The core Provider trait.
///
/// The inference driver calls `complete()` without knowing which backend is
/// behind it. Calls run to completion; retries are the caller's business.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "ollama").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError>;

    /// Load the model into memory ahead of the first real turn.
    ///
    /// Default implementation sends a one-word prompt without tools.
    async fn warm_up(&self, model: &str) -> Result<(), ProviderError> {
        self.complete(ProviderRequest {
            model: model.to_string(),
            messages: vec![Message::user("hi")],
            tools: Vec::new(),
            temperature: None,
        })
        .await
        .map(|_| ())
    }

    /// List available models for this provider.
    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    /// Health check: can we reach the backend?
    async fn health_check(&self) -> Result<bool, ProviderError> {
        Ok(true)
    }
}
