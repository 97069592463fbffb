//! Completion provider abstraction.
//!
//! The handler only needs "prompt pair in, plan text out"; the OpenAI-compatible
//! HTTP backend and the mock used in tests and local development both sit
//! behind [`CompletionProvider`].

pub mod mock;
pub mod openai;

use crate::services::prompt::PromptPair;
use async_trait::async_trait;
use thiserror::Error;

pub use mock::MockCompletionProvider;
pub use openai::OpenAiProvider;

/// Plan text used when the provider answered without usable content.
pub const NO_PLAN_FALLBACK: &str = "No plan generated. Try again.";

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::NetworkError(_) => "network",
            ProviderError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// What came back from one completion call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderResponse {
    /// `choices[0].message.content`, if the provider sent one.
    pub text: Option<String>,

    /// HTTP status reported by the upstream, when there is one.
    pub status: Option<u16>,

    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Plan text ready to return, and whether it is the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanText {
    pub text: String,
    pub is_fallback: bool,
}

impl ProviderResponse {
    /// Trimmed content, or [`NO_PLAN_FALLBACK`] when it is missing or blank.
    pub fn into_plan_text(self) -> PlanText {
        match self
            .text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
        {
            Some(text) => PlanText {
                text,
                is_fallback: false,
            },
            None => PlanText {
                text: NO_PLAN_FALLBACK.to_string(),
                is_fallback: true,
            },
        }
    }
}

/// Trait for chat-completion backends.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    /// Run one completion for the prompt pair.
    ///
    /// `request_id` is forwarded upstream for correlation.
    async fn complete(
        &self,
        prompt: &PromptPair,
        request_id: Option<&str>,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Cheap local readiness check; makes no network call.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
