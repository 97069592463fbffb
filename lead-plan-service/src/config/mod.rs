use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-5";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 120;
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;
const DEFAULT_BODY_LIMIT_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct LeadPlanConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub completion: CompletionConfig,
    pub webhook: WebhookConfig,
    pub http: HttpConfig,
    pub observability: ObservabilityConfig,
}

/// Which backend answers completion requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Mock,
}

impl std::str::FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "Unknown COMPLETION_PROVIDER '{}': expected 'openai' or 'mock'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    pub provider: ProviderKind,
    /// Chat-completion endpoint (OpenAI-compatible).
    pub api_url: String,
    /// Bearer secret for the completion API. Never logged or returned.
    pub api_key: Secret<String>,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl CompletionConfig {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// CRM webhook URL. `None` disables forwarding entirely.
    pub url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Origins allowed to post the intake form. Empty allows any origin.
    pub cors_allowed_origins: Vec<String>,
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    pub otlp_endpoint: Option<String>,
}

impl LeadPlanConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(LeadPlanConfig {
            common: common_config,
            completion: CompletionConfig {
                provider: get_env("COMPLETION_PROVIDER", Some("openai"), is_prod)?.parse()?,
                api_url: get_env("OPENAI_URL", Some(DEFAULT_COMPLETION_URL), is_prod)?,
                api_key: Secret::new(get_env("OPENAI_API_KEY", Some(""), is_prod)?),
                model: get_env("OPENAI_MODEL", Some(DEFAULT_COMPLETION_MODEL), is_prod)?,
                temperature: parse_env(
                    "LEAD_PLAN_TEMPERATURE",
                    DEFAULT_TEMPERATURE,
                    is_prod,
                )?,
                timeout_secs: parse_env(
                    "OPENAI_TIMEOUT_SECS",
                    DEFAULT_COMPLETION_TIMEOUT_SECS,
                    is_prod,
                )?,
            },
            webhook: WebhookConfig {
                // Optional even in prod: no URL means no CRM forwarding.
                url: optional_env("CRMX_WEBHOOK_URL"),
                timeout_secs: parse_env(
                    "CRMX_WEBHOOK_TIMEOUT_SECS",
                    DEFAULT_WEBHOOK_TIMEOUT_SECS,
                    is_prod,
                )?,
            },
            http: HttpConfig {
                cors_allowed_origins: optional_env("CORS_ALLOWED_ORIGINS")
                    .map(|origins| split_list(&origins))
                    .unwrap_or_default(),
                body_limit_bytes: parse_env(
                    "LEAD_PLAN_BODY_LIMIT_BYTES",
                    DEFAULT_BODY_LIMIT_BYTES,
                    is_prod,
                )?,
            },
            observability: ObservabilityConfig {
                otlp_endpoint: optional_env("OTLP_ENDPOINT"),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: T, is_prod: bool) -> Result<T, AppError>
where
    T: std::str::FromStr + ToString,
    T::Err: std::fmt::Display,
{
    get_env(key, Some(&default.to_string()), is_prod)?
        .trim()
        .parse()
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("{} is invalid: {}", key, e)))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
