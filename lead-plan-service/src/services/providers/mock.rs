//! Mock provider for tests and local development.

use super::{CompletionProvider, ProviderError, ProviderResponse};
use crate::services::prompt::PromptPair;
use async_trait::async_trait;

/// Mock completion provider.
///
/// Answers with a canned plan that echoes the first line of the user prompt,
/// or with a fixed reply (possibly none) when built with [`Self::with_reply`].
pub struct MockCompletionProvider {
    enabled: bool,
    reply: Option<Option<String>>,
}

impl MockCompletionProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            reply: None,
        }
    }

    /// Always answer with `reply`; `None` simulates a response without content.
    pub fn with_reply(reply: Option<&str>) -> Self {
        Self {
            enabled: true,
            reply: Some(reply.map(str::to_string)),
        }
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        prompt: &PromptPair,
        _request_id: Option<&str>,
    ) -> Result<ProviderResponse, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock completion provider not enabled".to_string(),
            ));
        }

        let text = match &self.reply {
            Some(reply) => reply.clone(),
            None => Some(format!(
                "Mock lead plan for: {}",
                prompt.user.lines().next().unwrap_or_default()
            )),
        };

        Ok(ProviderResponse {
            output_tokens: text.as_deref().map_or(0, |t| t.len() as u64 / 4),
            text,
            status: None,
            input_tokens: (prompt.system.len() + prompt.user.len()) as u64 / 4,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock completion provider not enabled".to_string(),
            ))
        }
    }
}
