//! Liveness endpoint.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::AppState;

/// Liveness response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always "healthy" when the process answers.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Chart templates available for import.
    pub charts: usize,
    /// Organizations with cached fiscal years.
    pub cached_fiscal_year_scopes: u64,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        charts: state.charts.list().count(),
        cached_fiscal_year_scopes: state.fiscal_years.entry_count(),
    })
}

/// Creates the public health route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
