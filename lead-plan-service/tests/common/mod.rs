use lead_plan_service::config::{
    CompletionConfig, HttpConfig, LeadPlanConfig, ObservabilityConfig, ProviderKind,
    WebhookConfig,
};
use lead_plan_service::startup::Application;
use secrecy::Secret;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_API_KEY: &str = "sk-test-key";
pub const COMPLETION_PATH: &str = "/v1/chat/completions";
pub const WEBHOOK_PATH: &str = "/hooks/crmx";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the service on a random port against the given completion base
    /// URL and optional webhook URL.
    pub async fn spawn(completion_base: &str, webhook_url: Option<String>) -> Self {
        let config = LeadPlanConfig {
            common: service_core::config::Config {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
                log_level: "debug".to_string(),
            },
            completion: CompletionConfig {
                provider: ProviderKind::OpenAi,
                api_url: format!("{}{}", completion_base, COMPLETION_PATH),
                api_key: Secret::new(TEST_API_KEY.to_string()),
                model: "gpt-5".to_string(),
                temperature: 0.7,
                timeout_secs: 5,
            },
            webhook: WebhookConfig {
                url: webhook_url,
                timeout_secs: 2,
            },
            http: HttpConfig {
                cors_allowed_origins: vec!["https://leads.example".to_string()],
                body_limit_bytes: 64 * 1024,
            },
            observability: ObservabilityConfig {
                otlp_endpoint: None,
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            client,
        }
    }

    pub async fn post_lead_plan(&self, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.client
            .post(format!("{}/api/local-lead-plan", self.address))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_intake(&self, intake: &Value) -> reqwest::Response {
        self.post_lead_plan(intake.to_string()).await
    }
}

/// Chat-completion body with the given assistant content.
pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 300, "completion_tokens": 500, "total_tokens": 800 }
    })
}

/// Mount a completion endpoint that answers every call with `response`.
pub async fn mount_completion(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Wait until the mock server has seen at least `count` requests on `route`.
pub async fn wait_for_requests(
    server: &MockServer,
    route: &str,
    count: usize,
) -> Vec<wiremock::Request> {
    for _ in 0..100 {
        let received: Vec<_> = server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == route)
            .collect();
        if received.len() >= count {
            return received;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("Timed out waiting for {} request(s) on {}", count, route);
}
