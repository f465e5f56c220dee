//! Chart-of-accounts template routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use bursar_core::hooks::PermissionType;
use bursar_db::AccountRepository;
use bursar_shared::AppError;
use bursar_shared::types::OrganizationName;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::accounts::load_organization;
use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::Caller;

/// Creates the chart routes (requires identity middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/charts", get(list_charts))
        .route("/charts/{chart}/accounts", get(chart_accounts))
        .route("/organizations/{org}/chart-import", post(import_chart))
}

/// Query parameters for browsing a template.
#[derive(Debug, Deserialize)]
pub struct ChartAccountsParams {
    /// Node being expanded; the root when absent or "All Accounts".
    pub parent: Option<String>,
}

/// Request body for importing a template.
#[derive(Debug, Deserialize)]
pub struct ImportChartRequest {
    /// Template key.
    pub chart: String,
}

/// Lists the available templates.
async fn list_charts(State(state): State<AppState>) -> impl IntoResponse {
    let charts: Vec<_> = state
        .charts
        .list()
        .map(|(key, name)| json!({ "key": key, "name": name }))
        .collect();
    Json(json!({ "charts": charts }))
}

/// Lists template nodes under a parent.
async fn chart_accounts(
    State(state): State<AppState>,
    Path(chart): Path<String>,
    Query(params): Query<ChartAccountsParams>,
) -> ApiResult<impl IntoResponse> {
    let template = state.charts.get(&chart)?;
    Ok(Json(template.coa_children(params.parent.as_deref())))
}

/// Creates an organization's accounts from a template.
async fn import_chart(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(org): Path<OrganizationName>,
    Json(req): Json<ImportChartRequest>,
) -> ApiResult<impl IntoResponse> {
    if !state.permits("Account", &principal, PermissionType::Create, None) {
        return Err(AppError::Forbidden("Not permitted to create Account".to_string()).into());
    }

    let template = state.charts.get(&req.chart)?;
    let organization = load_organization(&state, &org).await?;

    let accounts = AccountRepository::new((*state.db).clone())
        .import_chart(template, &organization)
        .await?;

    info!(
        organization = %organization.name,
        chart = %req.chart,
        accounts = accounts.len(),
        user = %principal.user,
        "Chart imported"
    );
    Ok((StatusCode::CREATED, Json(json!({ "created": accounts.len() }))))
}
