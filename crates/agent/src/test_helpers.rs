//! Shared test helpers: scripted providers.

use climactl_core::error::ProviderError;
use climactl_core::message::{Message, ToolRequest};
use climactl_core::provider::{Provider, ProviderRequest, ProviderResponse, Timings};
use std::sync::Mutex;

/// A provider that returns a sequence of scripted outcomes and records
/// every request it receives.
///
/// Panics if more calls are made than outcomes provided.
pub struct SequentialMockProvider {
    outcomes: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(outcomes: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn single_text(text: &str) -> Self {
        Self::new(vec![Ok(make_text_response(text))])
    }

    pub fn tool_then_answer(calls: Vec<ToolRequest>, answer: &str) -> Self {
        Self::new(vec![
            Ok(make_tool_call_response(calls)),
            Ok(make_text_response(answer)),
        ])
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let mut outcomes = self.outcomes.lock().unwrap();
        assert!(
            !outcomes.is_empty(),
            "SequentialMockProvider: no more responses (call #{})",
            requests.len()
        );
        requests.push(request);
        outcomes.remove(0)
    }
}

/// A model that requests `get_led_status` on every single call.
#[derive(Default)]
pub struct AlwaysToolProvider {
    calls: Mutex<usize>,
}

impl AlwaysToolProvider {
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for AlwaysToolProvider {
    fn name(&self) -> &str {
        "always_tool"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        *self.calls.lock().unwrap() += 1;
        Ok(make_tool_call_response(vec![ToolRequest::new(
            "get_led_status",
            serde_json::json!({}),
        )]))
    }
}

pub fn timings() -> Timings {
    Timings {
        total_duration: Some(1_500_000_000),
        eval_count: Some(30),
        eval_duration: Some(1_000_000_000),
        ..Timings::default()
    }
}

/// A final text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        model: "mock-model".into(),
        timings: timings(),
    }
}

/// A response carrying tool requests and no text.
pub fn make_tool_call_response(calls: Vec<ToolRequest>) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant_with_tools("", calls),
        model: "mock-model".into(),
        timings: timings(),
    }
}
