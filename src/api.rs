use crate::energy::EnergyReport;
use crate::hub::HubHandle;
use crate::metrics::MetricsExporter;
use crate::render::{Formatter, PageView};
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub hub: HubHandle,
    pub formatter: Arc<Formatter>,
    pub exporter: MetricsExporter,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/status", get(status))
        .route("/energy", get(energy))
        .route("/metrics", get(metrics))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// One display record per request, built from whatever snapshot is current.
async fn status(State(state): State<AppState>) -> Result<Json<PageView>, StatusCode> {
    let snapshot = state.hub.snapshot().await.map_err(|e| {
        error!("status request failed: {e}");
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    Ok(Json(state.formatter.page_view(&snapshot)))
}

/// Energy accumulated since the previous read; reading resets the totals.
async fn energy(State(state): State<AppState>) -> Result<Json<EnergyReport>, StatusCode> {
    let report = state.hub.energy_report().await.map_err(|e| {
        error!("energy report request failed: {e}");
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    Ok(Json(report))
}

/// Prometheus text exposition.
async fn metrics(State(state): State<AppState>) -> Result<String, StatusCode> {
    state.exporter.gather().map_err(|e| {
        error!("metrics encoding failed: {e}");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
