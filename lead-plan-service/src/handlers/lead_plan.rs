//! `POST /api/local-lead-plan`: intake in, plan text out.
//!
//! Flow: parse the body leniently, build the prompt pair, await the
//! completion, hand the result to the CRM webhook without waiting, respond.
//! Only a wrong method, an unreadable or oversized body, or a failed
//! completion call reaches the caller as an error; everything else degrades
//! into a successful response.

use crate::models::{Intake, WebhookPayload};
use crate::services::metrics;
use crate::services::providers::ProviderError;
use crate::services::PromptPair;
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use service_core::middleware::RequestId;
use std::time::Instant;
use thiserror::Error;

pub const GENERIC_SERVER_ERROR: &str = "Server error";

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub ok: bool,
    #[serde(rename = "planText")]
    pub plan_text: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

#[derive(Debug, Error)]
pub enum LeadPlanError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Body could not be buffered, e.g. it exceeds the configured limit.
    #[error("{}", .0.body_text())]
    Body(BytesRejection),

    #[error("{0}")]
    Completion(#[from] ProviderError),
}

impl IntoResponse for LeadPlanError {
    fn into_response(self) -> Response {
        let status = match &self {
            LeadPlanError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            LeadPlanError::Body(rejection) => rejection.status(),
            LeadPlanError::Completion(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let error = error_message(self.to_string());
        (status, Json(ErrorResponse { ok: false, error })).into_response()
    }
}

/// The error's own text, or [`GENERIC_SERVER_ERROR`] when it has none.
fn error_message(message: String) -> String {
    if message.trim().is_empty() {
        GENERIC_SERVER_ERROR.to_string()
    } else {
        message
    }
}

#[tracing::instrument(skip_all, fields(request_id = tracing::field::Empty))]
pub async fn create_lead_plan(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PlanResponse>, LeadPlanError> {
    let request_id = request_id.map(|Extension(RequestId(id))| id);
    if let Some(id) = &request_id {
        tracing::Span::current().record("request_id", id.as_str());
    }

    let body = body.map_err(|rejection| {
        metrics::record_lead_plan("rejected");
        tracing::warn!(
            status = %rejection.status(),
            error = %rejection.body_text(),
            "Intake body rejected"
        );
        LeadPlanError::Body(rejection)
    })?;

    let intake = Intake::from_body(&body);
    let prompt = PromptPair::for_intake(&intake);

    tracing::info!(
        industry = %intake.industry,
        city = %intake.city,
        state = %intake.state,
        "Generating lead plan"
    );

    let provider = state.completion.as_ref();
    let started = Instant::now();
    let response = provider
        .complete(&prompt, request_id.as_deref())
        .await
        .map_err(|e| {
            metrics::record_completion_error(provider.name(), e.kind());
            metrics::record_lead_plan("error");
            tracing::error!(error = %e, provider = provider.name(), "Completion call failed");
            LeadPlanError::from(e)
        })?;

    metrics::record_completion_latency(
        provider.name(),
        provider.model(),
        started.elapsed().as_secs_f64(),
    );
    metrics::record_tokens(
        provider.model(),
        response.input_tokens,
        response.output_tokens,
    );

    let upstream_status = response.status;
    let plan = response.into_plan_text();
    if plan.is_fallback {
        metrics::record_completion_fallback();
        metrics::record_lead_plan("fallback");
        tracing::warn!(
            upstream_status = ?upstream_status,
            "Completion had no usable content, returning placeholder plan"
        );
    } else {
        metrics::record_lead_plan("ok");
    }

    if let Some(webhook) = &state.webhook {
        webhook.dispatch(WebhookPayload::new(&intake, &plan.text), request_id);
    }

    Ok(Json(PlanResponse {
        ok: true,
        plan_text: plan.text,
    }))
}

/// Any verb other than POST on the lead-plan route.
pub async fn method_not_allowed() -> LeadPlanError {
    LeadPlanError::MethodNotAllowed
}
