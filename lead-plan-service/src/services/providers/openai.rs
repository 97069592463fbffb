//! OpenAI-compatible chat-completion provider.
//!
//! Sends the system and user messages to the configured endpoint with a
//! bearer key. The response body is read whatever the status. Only a body
//! that cannot be read or is not JSON counts as an error; a JSON answer
//! without `choices[0].message.content` is a response with no text.

use super::{CompletionProvider, ProviderError, ProviderResponse};
use crate::config::CompletionConfig;
use crate::services::prompt::PromptPair;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;
use service_core::observability::TracedClientExt;
use std::time::Duration;

pub struct OpenAiProvider {
    config: CompletionConfig,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(config: CompletionConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    fn build_request<'a>(&'a self, prompt: &'a PromptPair) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: [
                ChatMessage {
                    role: Role::System,
                    content: prompt.system,
                },
                ChatMessage {
                    role: Role::User,
                    content: &prompt.user,
                },
            ],
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(
        &self,
        prompt: &PromptPair,
        request_id: Option<&str>,
    ) -> Result<ProviderResponse, ProviderError> {
        let request = self.build_request(prompt);

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.user.len(),
            "Sending request to completion API"
        );

        let response = self
            .client
            .traced_post(&self.config.api_url)
            .bearer_auth(self.config.api_key.expose_secret())
            .request_id(request_id)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body_len = body.len(),
                "Completion API returned an error status"
            );
        }

        let json: Value = serde_json::from_str(&body).map_err(|e| {
            ProviderError::InvalidResponse(format!(
                "Completion API returned non-JSON body (status {}): {}",
                status, e
            ))
        })?;

        Ok(parse_completion(&json, status.as_u16()))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.expose_secret().trim().is_empty() {
            return Err(ProviderError::NotConfigured(
                "Completion API key not configured".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pull the plan text and token usage out of a chat-completion body.
fn parse_completion(json: &Value, status: u16) -> ProviderResponse {
    let text = json
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string);

    let usage = |field: &str| {
        json.pointer(&format!("/usage/{}", field))
            .and_then(Value::as_u64)
            .unwrap_or(0)
    };

    ProviderResponse {
        text,
        status: Some(status),
        input_tokens: usage("prompt_tokens"),
        output_tokens: usage("completion_tokens"),
    }
}

// ============================================================================
// Chat Completion Request Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum Role {
    System,
    User,
}
