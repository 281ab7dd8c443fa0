//! OpenAI-compatible LLM backend.
//!
//! Works with any OpenAI-compatible chat completions API including:
//! - OpenAI API
//! - vLLM
//! - Ollama
//! - Google Gemini (OpenAI compatibility endpoint)

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::*;

/// OpenAI-compatible backend.
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    capabilities: ModelCapabilities,
}

impl OpenAiBackend {
    /// Create a new OpenAI-compatible backend.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, LlmError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            capabilities: ModelCapabilities {
                max_output_tokens: 8192,
                supports_json_schema: true,
            },
        })
    }

    /// Create a backend pointing to Ollama.
    pub fn ollama(model: &str) -> Result<Self, LlmError> {
        Self::new("http://localhost:11434/v1", model, None)
    }

    /// Build the request URL.
    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Build authorization header if API key is set.
    fn auth_header(&self) -> Option<String> {
        self.api_key.as_ref().map(|k| format!("Bearer {}", k))
    }

    fn response_format(&self, format: &ResponseFormat) -> ResponseFormatRequest {
        match format.format_type {
            ResponseFormatType::JsonSchema if self.capabilities.supports_json_schema => {
                ResponseFormatRequest {
                    format_type: "json_schema".to_string(),
                    json_schema: format.schema.as_ref().map(|schema| JsonSchemaRequest {
                        name: format.name.clone().unwrap_or_else(|| "output".to_string()),
                        schema: schema.clone(),
                    }),
                }
            }
            ResponseFormatType::JsonSchema => ResponseFormatRequest {
                format_type: "json_object".to_string(),
                json_schema: None,
            },
            ResponseFormatType::Text => ResponseFormatRequest {
                format_type: "text".to_string(),
                json_schema: None,
            },
        }
    }
}

/// OpenAI chat completion request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatRequest>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormatRequest {
    #[serde(rename = "type")]
    format_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    json_schema: Option<JsonSchemaRequest>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaRequest {
    name: String,
    schema: serde_json::Value,
}

/// OpenAI chat completion response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<UsageResponse>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageResponse {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    fn id(&self) -> &str {
        &self.model
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        let mut request = self.client.get(&url);

        if let Some(auth) = self.auth_header() {
            request = request.header(header::AUTHORIZATION, auth);
        }

        request
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut messages: Vec<ChatMessage> = Vec::new();

        if let Some(system) = &request.system_prompt {
            messages.push(ChatMessage {
                role: MessageRole::System.as_str(),
                content: system.clone(),
            });
        }

        for msg in &request.messages {
            messages.push(ChatMessage {
                role: msg.role.as_str(),
                content: msg.content.clone(),
            });
        }

        let chat_request = ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request
                .response_format
                .as_ref()
                .map(|rf| self.response_format(rf)),
            stream: false,
        };

        let mut http_request = self.client.post(self.chat_completions_url());

        if let Some(auth) = self.auth_header() {
            http_request = http_request.header(header::AUTHORIZATION, auth);
        }

        debug!(model = %self.model, "Sending chat completion request");

        let response = http_request
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();

            if status.as_u16() == 429 {
                let retry_after_ms = response
                    .headers()
                    .get(header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(|secs| secs.saturating_mul(1000));
                return Err(LlmError::RateLimited { retry_after_ms });
            }

            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::ParseError("No choices in response".to_string()))?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        if finish_reason == FinishReason::ContentFilter {
            return Err(LlmError::ContentFiltered {
                reason: "Backend filtered the completion".to_string(),
            });
        }

        let content = choice.message.content.unwrap_or_default();

        let usage = chat_response
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            finish_reason,
            usage,
        })
    }

    fn capabilities(&self) -> &ModelCapabilities {
        &self.capabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion_body(content: &str, finish_reason: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": finish_reason,
            }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 7 },
        })
    }

    #[test]
    fn test_ollama_creation() {
        let backend = OpenAiBackend::ollama("llama3.2").unwrap();
        assert_eq!(backend.id(), "llama3.2");
        assert!(backend.capabilities().supports_json_schema);
    }

    #[tokio::test]
    async fn test_complete_sends_schema_and_auth() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-test",
                "response_format": {
                    "type": "json_schema",
                    "json_schema": { "name": "curriculum" },
                },
                "stream": false,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("{}", "stop")))
            .expect(1)
            .mount(&server)
            .await;

        let backend =
            OpenAiBackend::new(format!("{}/v1/", server.uri()), "gpt-test", Some("sk-test".into()))
                .unwrap();

        let request = CompletionRequest::user("Plan")
            .with_system("System")
            .with_json_schema("curriculum", serde_json::json!({"type": "object"}));

        let response = backend.complete(request).await.unwrap();
        assert_eq!(response.content, "{}");
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.usage.total(), 19);
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "2"))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new(server.uri(), "m", None).unwrap();
        let err = backend
            .complete(CompletionRequest::user("Hi"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LlmError::RateLimited {
                retry_after_ms: Some(2000)
            }
        ));
    }

    #[tokio::test]
    async fn test_huge_retry_after_saturates() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(429).insert_header("retry-after", "18446744073709551615"),
            )
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new(server.uri(), "m", None).unwrap();
        let err = backend
            .complete(CompletionRequest::user("Hi"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LlmError::RateLimited {
                retry_after_ms: Some(u64::MAX)
            }
        ));
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new(server.uri(), "m", None).unwrap();
        let err = backend
            .complete(CompletionRequest::user("Hi"))
            .await
            .unwrap_err();

        match err {
            LlmError::RequestFailed(message) => assert!(message.contains("boom")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_content_filtered() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body("", "content_filter")),
            )
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new(server.uri(), "m", None).unwrap();
        let err = backend
            .complete(CompletionRequest::user("Hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::ContentFiltered { .. }));
    }

    #[tokio::test]
    async fn test_availability() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new(server.uri(), "m", None).unwrap();
        assert!(backend.is_available().await);
    }
}
