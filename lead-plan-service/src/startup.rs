//! Application startup and lifecycle management.

use crate::config::{HttpConfig, LeadPlanConfig, ProviderKind};
use crate::handlers::{health, lead_plan};
use crate::middleware::metrics_middleware;
use crate::services::metrics::init_metrics;
use crate::services::{CompletionProvider, CrmWebhook, MockCompletionProvider, OpenAiProvider};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use service_core::error::AppError;
use service_core::middleware::{request_id_middleware, security_headers_middleware};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state. Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub completion: Arc<dyn CompletionProvider>,
    /// `None` when no CRM webhook URL is configured.
    pub webhook: Option<Arc<CrmWebhook>>,
}

impl AppState {
    pub fn from_config(config: &LeadPlanConfig) -> Result<Self, AppError> {
        let completion: Arc<dyn CompletionProvider> = match config.completion.provider {
            ProviderKind::OpenAi => {
                if !config.completion.has_api_key() {
                    tracing::warn!("OPENAI_API_KEY is not set - completion calls will be rejected upstream");
                }
                let provider = OpenAiProvider::new(config.completion.clone())
                    .map_err(|e| AppError::ConfigError(e.into()))?;
                tracing::info!(
                    model = %config.completion.model,
                    endpoint = %config.completion.api_url,
                    "Initialized OpenAI completion provider"
                );
                Arc::new(provider)
            }
            ProviderKind::Mock => {
                tracing::info!("Using mock completion provider");
                Arc::new(MockCompletionProvider::new(true))
            }
        };

        let webhook = CrmWebhook::from_config(&config.webhook)
            .map_err(|e| AppError::ConfigError(e.into()))?
            .map(Arc::new);
        match &webhook {
            Some(_) => tracing::info!("CRM webhook forwarding enabled"),
            None => tracing::info!("CRM webhook URL not set - forwarding disabled"),
        }

        Ok(Self {
            completion,
            webhook,
        })
    }
}

pub fn build_router(state: AppState, http: &HttpConfig) -> Router {
    Router::new()
        .route(
            "/api/local-lead-plan",
            post(lead_plan::create_lead_plan).fallback(lead_plan::method_not_allowed),
        )
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics_endpoint))
        .layer(DefaultBodyLimit::max(http.body_limit_bytes))
        .layer(cors_layer(&http.cors_allowed_origins))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: LeadPlanConfig) -> Result<Self, AppError> {
        init_metrics();

        let state = AppState::from_config(&config)?;
        let router = build_router(state, &config.http);

        // Port 0 binds a random port for testing
        let addr = format!("{}:{}", config.common.host, config.common.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Lead plan service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}
