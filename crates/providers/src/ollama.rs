//! Ollama provider implementation.
//!
//! Talks to the native `/api/chat` endpoint (non-streaming) so the response
//! carries Ollama's timing counters (`total_duration`, `eval_count`,
//! `eval_duration`, ...), which the status report turns into latency and
//! throughput figures.
//!
//! Supports:
//! - Chat completions with tool declarations
//! - Model listing and health checks via `/api/tags`

use async_trait::async_trait;
use climactl_core::error::ProviderError;
use climactl_core::message::{Message, ToolRequest};
use climactl_core::provider::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// A chat backend served by a local (or LAN) Ollama instance.
pub struct OllamaProvider {
    name: String,
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a provider for the server at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            name: "ollama".into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a provider for `http://localhost:11434` (convenience constructor).
    pub fn local() -> Result<Self, ProviderError> {
        Self::new("http://localhost:11434", Duration::from_secs(120))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Convert our Message types to Ollama's wire format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
                tool_calls: if m.tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        m.tool_calls
                            .iter()
                            .map(|tc| ApiToolCall {
                                function: ApiFunction {
                                    name: tc.name.clone(),
                                    arguments: serde_json::Value::Object(tc.arguments.clone()),
                                },
                            })
                            .collect(),
                    )
                },
                tool_name: m.tool_name.clone(),
            })
            .collect()
    }

    /// Convert tool definitions to Ollama's (OpenAI-shaped) format.
    fn to_api_tools(tools: &[ToolDefinition]) -> Vec<ApiToolDefinition> {
        tools
            .iter()
            .map(|t| ApiToolDefinition {
                r#type: "function".into(),
                function: ApiToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }

    fn request_body(request: &ProviderRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "stream": false,
        });

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(&request.tools));
        }

        if let Some(temperature) = request.temperature {
            body["options"] = serde_json::json!({ "temperature": temperature });
        }

        body
    }

    /// Turn a decoded `/api/chat` reply into our response type.
    fn into_response(api: ApiChatResponse) -> ProviderResponse {
        let tool_calls: Vec<ToolRequest> = api
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolRequest {
                arguments: normalize_arguments(&tc.function.name, tc.function.arguments),
                name: tc.function.name,
            })
            .collect();

        let message = Message::assistant_with_tools(api.message.content, tool_calls);

        ProviderResponse {
            message,
            model: api.model,
            timings: Timings {
                total_duration: api.total_duration,
                load_duration: api.load_duration,
                prompt_eval_count: api.prompt_eval_count,
                eval_count: api.eval_count,
                eval_duration: api.eval_duration,
            },
        }
    }

    async fn get_tags(&self) -> Result<reqwest::Response, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        self.client.get(&url).send().await.map_err(map_send_error)
    }
}

/// Models usually send an object; some send the object JSON-encoded as a string.
fn normalize_arguments(
    tool: &str,
    arguments: serde_json::Value,
) -> serde_json::Map<String, serde_json::Value> {
    match arguments {
        serde_json::Value::Object(map) => map,
        serde_json::Value::String(raw) => match serde_json::from_str(&raw) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => {
                warn!(tool, raw = %raw, "Unparseable tool arguments, using none");
                serde_json::Map::new()
            }
        },
        serde_json::Value::Null => serde_json::Map::new(),
        other => {
            warn!(tool, arguments = %other, "Non-object tool arguments, using none");
            serde_json::Map::new()
        }
    }
}

fn map_send_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

#[async_trait]
impl climactl_core::Provider for OllamaProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = Self::request_body(&request);

        debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending chat request"
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status().as_u16();

        if status == 404 {
            return Err(ProviderError::ModelNotFound(request.model));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        Ok(Self::into_response(api_response))
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let response = self.get_tags().await?;
        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let tags: ApiTagsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let response = self.get_tags().await?;
        Ok(response.status().is_success())
    }
}

// --- Ollama API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    function: ApiFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunction {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolDefinition {
    r#type: String,
    function: ApiToolFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiChatResponse {
    #[serde(default)]
    model: String,
    message: ApiMessage,
    #[serde(default)]
    total_duration: Option<u64>,
    #[serde(default)]
    load_duration: Option<u64>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
    #[serde(default)]
    eval_duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApiTagsResponse {
    #[serde(default)]
    models: Vec<ApiModel>,
}

#[derive(Debug, Deserialize)]
struct ApiModel {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use climactl_core::Provider;
    use climactl_core::message::Role;

    fn parse(json: &str) -> ProviderResponse {
        let api: ApiChatResponse = serde_json::from_str(json).unwrap();
        OllamaProvider::into_response(api)
    }

    #[test]
    fn local_constructor() {
        let provider = OllamaProvider::local().unwrap();
        assert_eq!(provider.name(), "ollama");
        assert!(provider.base_url().contains("localhost:11434"));
    }

    #[test]
    fn trailing_slash_trimmed() {
        let provider = OllamaProvider::new("http://pi.local:11434/", Duration::from_secs(5)).unwrap();
        assert_eq!(provider.base_url(), "http://pi.local:11434");
    }

    #[test]
    fn message_conversion() {
        let messages = vec![Message::system("You are helpful"), Message::user("Hello")];
        let api_messages = OllamaProvider::to_api_messages(&messages);
        assert_eq!(api_messages.len(), 2);
        assert_eq!(api_messages[0].role, "system");
        assert_eq!(api_messages[1].role, "user");
        assert!(api_messages[1].tool_calls.is_none());
    }

    #[test]
    fn message_conversion_with_tool_calls() {
        let msg = Message::assistant_with_tools(
            "",
            vec![ToolRequest::new(
                "set_led_state",
                serde_json::json!({"color": "red", "state": "on"}),
            )],
        );
        let api_msgs = OllamaProvider::to_api_messages(&[msg]);
        let tc = api_msgs[0].tool_calls.as_ref().unwrap();
        assert_eq!(tc.len(), 1);
        assert_eq!(tc[0].function.name, "set_led_state");
        assert_eq!(tc[0].function.arguments["color"], "red");
    }

    #[test]
    fn message_conversion_tool_response() {
        let msg = Message::tool_result("get_led_status", r#"{"red_led_status":"on"}"#);
        let api_msgs = OllamaProvider::to_api_messages(&[msg]);
        assert_eq!(api_msgs[0].role, "tool");
        assert_eq!(api_msgs[0].tool_name.as_deref(), Some("get_led_status"));
        let json = serde_json::to_value(&api_msgs[0]).unwrap();
        assert!(json.get("tool_calls").is_none());
    }

    #[test]
    fn request_body_shape() {
        let request = ProviderRequest {
            model: "qwen2.5:1.5b".into(),
            messages: vec![Message::user("hi")],
            tools: vec![ToolDefinition {
                name: "get_led_status".into(),
                description: "Returns LED state".into(),
                parameters: serde_json::json!({"type": "object", "properties": {}}),
            }],
            temperature: Some(0.2),
        };
        let body = OllamaProvider::request_body(&request);
        assert_eq!(body["stream"], false);
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "get_led_status");
        assert!((body["options"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn request_body_without_tools_or_options() {
        let request = ProviderRequest {
            model: "m".into(),
            messages: vec![],
            tools: vec![],
            temperature: None,
        };
        let body = OllamaProvider::request_body(&request);
        assert!(body.get("tools").is_none());
        assert!(body.get("options").is_none());
    }

    #[test]
    fn parse_plain_reply_with_timings() {
        let response = parse(
            r#"{
                "model": "qwen2.5:1.5b",
                "created_at": "2024-06-01T10:00:00Z",
                "message": {"role": "assistant", "content": "It is 24.6°C."},
                "done": true,
                "total_duration": 3120000000,
                "load_duration": 12000000,
                "prompt_eval_count": 210,
                "prompt_eval_duration": 900000000,
                "eval_count": 18,
                "eval_duration": 1500000000
            }"#,
        );
        assert_eq!(response.model, "qwen2.5:1.5b");
        assert_eq!(response.message.role, Role::Assistant);
        assert_eq!(response.message.content, "It is 24.6°C.");
        assert!(!response.message.has_tool_calls());
        assert_eq!(response.timings.eval_count, Some(18));
        assert!((response.timings.eval_rate().unwrap() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn parse_tool_call_reply() {
        let response = parse(
            r#"{
                "model": "qwen2.5:1.5b",
                "message": {
                    "role": "assistant",
                    "content": "",
                    "tool_calls": [
                        {"function": {"name": "set_led_state", "arguments": {"color": "red", "state": "on"}}},
                        {"function": {"name": "get_led_status", "arguments": {}}}
                    ]
                },
                "done": true
            }"#,
        );
        let calls = &response.message.tool_calls;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "set_led_state");
        assert_eq!(calls[0].arguments["state"], "on");
        assert_eq!(calls[1].name, "get_led_status");
        assert!(response.timings.total_duration.is_none());
    }

    #[test]
    fn string_encoded_arguments_are_decoded() {
        let response = parse(
            r#"{
                "model": "m",
                "message": {
                    "role": "assistant",
                    "content": "",
                    "tool_calls": [
                        {"function": {"name": "set_led_state", "arguments": "{\"color\":\"green\",\"state\":\"off\"}"}}
                    ]
                }
            }"#,
        );
        assert_eq!(response.message.tool_calls[0].arguments["color"], "green");
    }

    #[test]
    fn garbage_arguments_become_empty() {
        assert!(normalize_arguments("t", serde_json::json!("not json")).is_empty());
        assert!(normalize_arguments("t", serde_json::json!([1, 2])).is_empty());
        assert!(normalize_arguments("t", serde_json::Value::Null).is_empty());
    }

    #[test]
    fn parse_tags() {
        let tags: ApiTagsResponse =
            serde_json::from_str(r#"{"models":[{"name":"qwen2.5:1.5b","size":986000000}]}"#).unwrap();
        assert_eq!(tags.models[0].name, "qwen2.5:1.5b");
    }
}
