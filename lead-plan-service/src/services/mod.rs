pub mod metrics;
pub mod prompt;
pub mod providers;
pub mod webhook;

pub use prompt::PromptPair;
pub use providers::{CompletionProvider, MockCompletionProvider, OpenAiProvider, ProviderError};
pub use webhook::CrmWebhook;
