//! The tool-calling inference driver.

use std::sync::Arc;

use climactl_config::SlmConfig;
use climactl_core::error::ProviderError;
use climactl_core::message::{Conversation, Message};
use climactl_core::provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
use climactl_core::tool::ToolRegistry;
use tracing::{debug, info, warn};

/// Runs one bounded tool-calling round against the model.
pub struct InferenceDriver {
    /// The model backend
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Sampling temperature; `None` leaves the backend default
    temperature: Option<f32>,

    /// Capability registry, read-only after startup
    tools: Arc<ToolRegistry>,

    /// Declarations sent with every request, in registration order
    definitions: Vec<ToolDefinition>,
}

impl InferenceDriver {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, tools: Arc<ToolRegistry>) -> Self {
        let definitions = tools.definitions();
        Self {
            provider,
            model: model.into(),
            temperature: None,
            tools,
            definitions,
        }
    }

    /// Build a driver with the model settings of the `[slm]` section.
    pub fn from_config(provider: Arc<dyn Provider>, config: &SlmConfig, tools: Arc<ToolRegistry>) -> Self {
        Self::new(provider, &config.model_name, tools).with_temperature(config.temperature)
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    async fn request(&self, conversation: &Conversation) -> Result<ProviderResponse, ProviderError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: conversation.messages().to_vec(),
            tools: self.definitions.clone(),
            temperature: self.temperature,
        };
        debug!(model = %self.model, messages = conversation.len(), "Sending request to model");
        self.provider.complete(request).await
    }

    /// Run the model over `conversation` and return its final response.
    ///
    /// When the first response requests tools, it is appended together with
    /// one tool message per request (in request order), and the model is
    /// asked exactly once more. That second response is final whatever it
    /// contains. The final response is NOT appended; that is the caller's job.
    ///
    /// Backend errors are returned as-is, without retry. Messages appended
    /// before the failure stay in the conversation.
    pub async fn run(&self, conversation: &mut Conversation) -> Result<ProviderResponse, ProviderError> {
        let first = self.request(conversation).await?;
        if !first.message.has_tool_calls() {
            return Ok(first);
        }

        let calls = first.message.tool_calls.clone();
        info!(requests = calls.len(), "Model requested tool calls, executing");
        conversation.push(first.message);

        for call in &calls {
            let result = self.tools.invoke(call).await;
            conversation.push(Message::tool_result(&call.name, result.content()));
            debug!(tool = %call.name, success = result.success, "Tool result sent back to the model");
        }

        let follow_up = self.request(conversation).await?;
        if follow_up.message.has_tool_calls() {
            warn!(
                ignored = follow_up.message.tool_calls.len(),
                "Model asked for more tools after the tool round; treating reply as final"
            );
        }
        Ok(follow_up)
    }
}
