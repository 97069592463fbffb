use dotenvy::dotenv;
use lead_plan_service::config::LeadPlanConfig;
use lead_plan_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = LeadPlanConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "lead-plan-service",
        &config.common.log_level,
        config.observability.otlp_endpoint.as_deref(),
    );

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    tracing::info!("Lead plan service stopped");
    Ok(())
}
