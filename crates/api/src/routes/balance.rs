//! Ledger balance routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use bursar_core::accounts::TreeNode;
use bursar_core::ledger::{BalanceQuery, CountQuery, OutstandingField};
use bursar_shared::types::{AccountName, OrganizationName};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiResult;
use crate::middleware::Caller;
use crate::{AppState, today};

/// Creates the balance routes (requires identity middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/balance", get(balance_on))
        .route("/accounts/{account}/count", get(count_on))
        .route("/accounts/balances", post(account_balances))
}

/// Query parameters for the outstanding count.
#[derive(Debug, Deserialize)]
pub struct CountParams {
    /// Counted figure: `invoiced_amount`, `payables`, or any other name for a plain count.
    pub fieldname: String,
    /// As-of date.
    pub date: Option<NaiveDate>,
}

/// Request body for annotating tree nodes with balances.
#[derive(Debug, Deserialize)]
pub struct AccountBalancesRequest {
    /// Organization whose currency the balances are expressed in.
    pub organization: OrganizationName,
    /// Nodes as returned by the tree listing.
    pub accounts: Vec<TreeNode>,
}

/// Signed balance of an account or party as of a date.
async fn balance_on(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Query(mut query): Query<BalanceQuery>,
) -> ApiResult<impl IntoResponse> {
    query.ignore_account_permission = false;

    let balance = state
        .balance_repository()
        .balance_on(&query, today(), state.account_reader(&principal))
        .await?;

    Ok(Json(json!({ "balance": balance })))
}

/// Number of entries under an account that count toward a figure.
async fn count_on(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(account): Path<AccountName>,
    Query(params): Query<CountParams>,
) -> ApiResult<impl IntoResponse> {
    let query = CountQuery {
        account,
        field: OutstandingField::parse(&params.fieldname),
        date: params.date,
    };

    let count = state
        .balance_repository()
        .count_on(
            &query,
            state.precision(),
            today(),
            state.account_reader(&principal),
        )
        .await?;

    Ok(Json(json!({ "count": count })))
}

/// Annotates tree nodes with their balances.
async fn account_balances(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Json(req): Json<AccountBalancesRequest>,
) -> ApiResult<impl IntoResponse> {
    let nodes = state
        .balance_repository()
        .account_balances(
            req.accounts,
            &req.organization,
            today(),
            state.account_reader(&principal),
        )
        .await?;

    Ok(Json(nodes))
}
