//! Fiscal year routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use bursar_core::fiscal::{
    FiscalYear, FiscalYearLookup, Verbosity, correct_fiscal_year, find_fiscal_year,
    fiscal_year_filter_field, validate_fiscal_year,
};
use bursar_core::hooks::{DocEvent, Document, FISCAL_YEAR_DOCTYPE, PermissionType};
use bursar_shared::AppError;
use bursar_shared::types::{FiscalYearName, OrganizationName};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::Caller;

const DEFAULT_LABEL: &str = "Date";

/// Creates the fiscal year routes (requires identity middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fiscal-years", get(list_fiscal_years).post(create_fiscal_year))
        .route("/fiscal-years/resolve", get(resolve_fiscal_year))
        .route("/fiscal-years/filter-field", get(filter_field))
        .route("/fiscal-years/validate", post(validate))
}

/// Query parameters for listing fiscal years.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Only years usable by this organization.
    pub organization: Option<OrganizationName>,
}

/// Query parameters for resolving a fiscal year.
#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    /// Date the year must contain.
    pub date: Option<NaiveDate>,
    /// Explicit year name.
    pub fiscal_year: Option<FiscalYearName>,
    /// Organization scope.
    pub organization: Option<OrganizationName>,
    /// Field label used in the failure message.
    pub label: Option<String>,
    /// Report failures as user notices.
    #[serde(default = "default_verbose")]
    pub verbose: bool,
}

const fn default_verbose() -> bool {
    true
}

/// Request body for validating a document's fiscal year.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    /// Document date.
    pub date: NaiveDate,
    /// Claimed fiscal year. When absent, the containing year is returned instead.
    pub fiscal_year: Option<FiscalYearName>,
    /// Organization scope.
    pub organization: Option<OrganizationName>,
    /// Field label used in the failure message, e.g. "Posting Date".
    pub label: Option<String>,
}

/// Lists active fiscal years, latest first.
async fn list_fiscal_years(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    let years = state
        .fiscal_year_repository()
        .active_years(params.organization.as_ref())
        .await?;

    Ok(Json(json!({ "fiscal_years": years.as_slice() })))
}

/// Resolves the fiscal year containing a date or carrying a name.
async fn resolve_fiscal_year(
    State(state): State<AppState>,
    Query(params): Query<ResolveParams>,
) -> ApiResult<impl IntoResponse> {
    let years = state
        .fiscal_year_repository()
        .active_years(params.organization.as_ref())
        .await?;

    let verbosity = if params.verbose {
        Verbosity::Notify
    } else {
        Verbosity::Silent
    };
    let lookup = FiscalYearLookup {
        date: params.date,
        fiscal_year: params.fiscal_year.as_ref(),
        label: params.label.as_deref().unwrap_or(DEFAULT_LABEL),
        organization: params.organization.as_ref(),
        verbosity,
    };
    let year = find_fiscal_year(&years, &lookup)?;

    Ok(Json(year.clone()))
}

/// Describes a fiscal year select filter for report screens.
async fn filter_field(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    let years = state
        .fiscal_year_repository()
        .active_years(params.organization.as_ref())
        .await?;
    Ok(Json(fiscal_year_filter_field(&years)))
}

/// Checks a document date against its fiscal year.
async fn validate(
    State(state): State<AppState>,
    Json(req): Json<ValidateRequest>,
) -> ApiResult<impl IntoResponse> {
    let years = state
        .fiscal_year_repository()
        .active_years(req.organization.as_ref())
        .await?;
    let label = req.label.as_deref().unwrap_or(DEFAULT_LABEL);
    let organization = req.organization.as_ref();

    let fiscal_year = match req.fiscal_year {
        Some(claimed) => {
            validate_fiscal_year(&years, req.date, &claimed, label, organization)?;
            claimed
        }
        None => correct_fiscal_year(&years, req.date, label, organization)?,
    };

    Ok(Json(json!({ "fiscal_year": fiscal_year, "valid": true })))
}

/// Creates a fiscal year and fires its document events.
async fn create_fiscal_year(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Json(req): Json<FiscalYear>,
) -> ApiResult<impl IntoResponse> {
    if !state.permits(FISCAL_YEAR_DOCTYPE, &principal, PermissionType::Create, None) {
        return Err(AppError::Forbidden(format!(
            "Not permitted to create {FISCAL_YEAR_DOCTYPE}"
        ))
        .into());
    }

    let doc = fiscal_year_document(&req)?;
    state.hooks.dispatch(DocEvent::Validate, &doc)?;

    let year = state.fiscal_year_repository().create(req).await?;
    state.hooks.dispatch(DocEvent::AfterInsert, &doc)?;

    info!(fiscal_year = %year.name, user = %principal.user, "Fiscal year created");
    Ok((StatusCode::CREATED, Json(year)))
}

fn fiscal_year_document(year: &FiscalYear) -> Result<Document, ApiError> {
    let data = serde_json::to_value(year).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Document::new(FISCAL_YEAR_DOCTYPE, year.name.as_str(), data))
}
