use crate::config::Config;
use crate::errors::AppError;
use crate::models::{parse_lead_batch, LeadOutcome};
use crate::qualification::LeadQualifier;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Qualification engine with its source adapters already wired.
    pub qualifier: Arc<LeadQualifier>,
    /// Application configuration.
    pub config: Config,
}

/// Health check endpoint.
///
/// Returns the service status, version, which profile providers are
/// wired in and the per-source fetch timeout.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "lead-qualifier",
            "version": env!("CARGO_PKG_VERSION"),
            "sources": state.qualifier.configured_sources(),
            "fetch_timeout_secs": state.config.fetch_timeout.as_secs(),
        })),
    )
}

/// POST /api/v1/qualify
///
/// Accepts a JSON array of leads and answers with one outcome per lead,
/// in input order. The batch is validated as a whole before any external
/// profile is fetched.
///
/// # Returns
///
/// * `Ok(Json<Vec<LeadOutcome>>)` - One `qualified` or `failed` entry per lead.
/// * `Err(AppError::Validation)` - Body is not a JSON array or a lead misses a required field.
pub async fn qualify_leads(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Vec<LeadOutcome>>, AppError> {
    let Json(body) = payload?;
    let leads = parse_lead_batch(body).map_err(AppError::Validation)?;

    let batch_id = Uuid::new_v4();
    let span = tracing::info_span!("qualify_batch", %batch_id, leads = leads.len());

    let outcomes = async {
        tracing::info!("POST /api/v1/qualify - {} lead(s)", leads.len());
        state.qualifier.qualify_batch(leads).await
    }
    .instrument(span)
    .await;

    Ok(Json(outcomes))
}

/// Routes of the service without transport-level middleware.
///
/// Rate limiting needs the peer address and is layered on in `main`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/qualify", post(qualify_leads))
        .with_state(state)
}
