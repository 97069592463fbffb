//! Prometheus metrics for lead-plan-service.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::{Once, OnceLock};

static INIT: Once = Once::new();

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// HTTP metrics
pub static HTTP_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static HTTP_REQUEST_DURATION_SECONDS: OnceLock<HistogramVec> = OnceLock::new();

// Lead plan metrics
pub static LEAD_PLAN_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static COMPLETION_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static COMPLETION_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static COMPLETION_FALLBACKS_TOTAL: OnceLock<IntCounter> = OnceLock::new();
pub static COMPLETION_TOKENS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static WEBHOOK_DELIVERIES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Later calls are no-ops.
pub fn init_metrics() {
    INIT.call_once(|| match register_all() {
        Ok(()) => tracing::info!("Prometheus metrics initialized"),
        Err(e) => tracing::error!(error = %e, "Failed to initialize Prometheus metrics"),
    });
}

fn register_all() -> Result<(), prometheus::Error> {
    let registry = Registry::new();

    let http_requests = IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["method", "path", "status"],
    )?;

    let http_duration = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["method", "path"],
    )?;

    let lead_plans = IntCounterVec::new(
        Opts::new("lead_plan_requests_total", "Lead plan requests by outcome"),
        &["outcome"], // ok, fallback, rejected, error
    )?;

    let completion_latency = HistogramVec::new(
        HistogramOpts::new(
            "completion_latency_seconds",
            "Completion API latency in seconds",
        )
        .buckets(vec![0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
        &["provider", "model"],
    )?;

    let completion_errors = IntCounterVec::new(
        Opts::new("completion_errors_total", "Completion API failures"),
        &["provider", "error_type"],
    )?;

    let completion_fallbacks = IntCounter::new(
        "completion_fallbacks_total",
        "Completions answered with the placeholder plan",
    )?;

    let completion_tokens = IntCounterVec::new(
        Opts::new("completion_tokens_total", "Tokens reported by the completion API"),
        &["model", "type"], // type: input, output
    )?;

    let webhook_deliveries = IntCounterVec::new(
        Opts::new("webhook_deliveries_total", "CRM webhook deliveries by outcome"),
        &["outcome"],
    )?;

    registry.register(Box::new(http_requests.clone()))?;
    registry.register(Box::new(http_duration.clone()))?;
    registry.register(Box::new(lead_plans.clone()))?;
    registry.register(Box::new(completion_latency.clone()))?;
    registry.register(Box::new(completion_errors.clone()))?;
    registry.register(Box::new(completion_fallbacks.clone()))?;
    registry.register(Box::new(completion_tokens.clone()))?;
    registry.register(Box::new(webhook_deliveries.clone()))?;

    // Initialize globals
    let _ = HTTP_REQUESTS_TOTAL.set(http_requests);
    let _ = HTTP_REQUEST_DURATION_SECONDS.set(http_duration);
    let _ = LEAD_PLAN_REQUESTS_TOTAL.set(lead_plans);
    let _ = COMPLETION_LATENCY_SECONDS.set(completion_latency);
    let _ = COMPLETION_ERRORS_TOTAL.set(completion_errors);
    let _ = COMPLETION_FALLBACKS_TOTAL.set(completion_fallbacks);
    let _ = COMPLETION_TOKENS_TOTAL.set(completion_tokens);
    let _ = WEBHOOK_DELIVERIES_TOTAL.set(webhook_deliveries);
    let _ = REGISTRY.set(registry);

    Ok(())
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

// Helper functions for recording metrics

/// Record a completed HTTP request.
pub fn record_http_request(method: &str, path: &str, status: &str, duration_secs: f64) {
    if let Some(counter) = HTTP_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[method, path, status]).inc();
    }
    if let Some(histogram) = HTTP_REQUEST_DURATION_SECONDS.get() {
        histogram
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }
}

/// Record the outcome of one lead plan request.
pub fn record_lead_plan(outcome: &str) {
    if let Some(counter) = LEAD_PLAN_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

/// Record completion API latency.
pub fn record_completion_latency(provider: &str, model: &str, duration_secs: f64) {
    if let Some(histogram) = COMPLETION_LATENCY_SECONDS.get() {
        histogram
            .with_label_values(&[provider, model])
            .observe(duration_secs);
    }
}

/// Record a completion API failure.
pub fn record_completion_error(provider: &str, error_type: &str) {
    if let Some(counter) = COMPLETION_ERRORS_TOTAL.get() {
        counter.with_label_values(&[provider, error_type]).inc();
    }
}

/// Record a completion answered with the placeholder plan.
pub fn record_completion_fallback() {
    if let Some(counter) = COMPLETION_FALLBACKS_TOTAL.get() {
        counter.inc();
    }
}

/// Record token usage reported by the completion API.
pub fn record_tokens(model: &str, input_tokens: u64, output_tokens: u64) {
    if let Some(counter) = COMPLETION_TOKENS_TOTAL.get() {
        counter
            .with_label_values(&[model, "input"])
            .inc_by(input_tokens);
        counter
            .with_label_values(&[model, "output"])
            .inc_by(output_tokens);
    }
}

/// Record a CRM webhook delivery attempt.
pub fn record_webhook_delivery(outcome: &str) {
    if let Some(counter) = WEBHOOK_DELIVERIES_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}
