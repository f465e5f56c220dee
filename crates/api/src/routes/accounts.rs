//! Account creation and tree browsing routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use bursar_core::Organization;
use bursar_core::accounts::{NewAccount, TreeDoctype};
use bursar_core::hooks::{DocEvent, Document, PermissionType};
use bursar_db::{AccountRepository, CostCenterRepository, OrganizationRepository};
use bursar_shared::AppError;
use bursar_shared::types::OrganizationName;
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::Caller;

/// Creates the account routes (requires identity middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(create_account))
        .route("/tree/children", get(tree_children))
}

/// Query parameters for the tree widget.
#[derive(Debug, Deserialize)]
pub struct ChildrenParams {
    /// "Account" or "Cost Center".
    pub doctype: String,
    /// Node being expanded.
    pub parent: Option<String>,
    /// Organization whose roots are listed.
    pub organization: OrganizationName,
    /// List root nodes instead of the children of `parent`.
    #[serde(default)]
    pub is_root: bool,
}

/// Loads an organization or fails with 404.
pub(crate) async fn load_organization(
    state: &AppState,
    name: &OrganizationName,
) -> Result<Organization, ApiError> {
    OrganizationRepository::new((*state.db).clone())
        .find(name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Organization {name} not found")).into())
}

/// Creates an account under the tree.
async fn create_account(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Json(mut req): Json<NewAccount>,
) -> ApiResult<impl IntoResponse> {
    req.ignore_permissions = false;
    let organization = load_organization(&state, &req.organization).await?;

    let can_create = || state.permits("Account", &principal, PermissionType::Create, None);
    let account = AccountRepository::new((*state.db).clone())
        .create(req, &organization, can_create)
        .await?;

    let data = serde_json::to_value(&account).map_err(|e| AppError::Internal(e.to_string()))?;
    state.hooks.dispatch(
        DocEvent::AfterInsert,
        &Document::new("Account", account.name.as_str(), data),
    )?;

    info!(account = %account.name, user = %principal.user, "Account added from tree");
    Ok((StatusCode::CREATED, Json(account)))
}

/// Lists the children (or roots) of an account or cost center tree.
async fn tree_children(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Query(params): Query<ChildrenParams>,
) -> ApiResult<impl IntoResponse> {
    let doctype: TreeDoctype = params.doctype.parse()?;
    if !state.permits(doctype.as_str(), &principal, PermissionType::Read, None) {
        return Err(AppError::Forbidden(format!("Not permitted to read {doctype}")).into());
    }

    // Expanding the organization node itself lists the roots.
    let parent = params
        .parent
        .as_deref()
        .filter(|p| !p.is_empty() && *p != params.organization.as_str());
    let is_root = params.is_root || parent.is_none();

    let nodes = match doctype {
        TreeDoctype::Account => {
            AccountRepository::new((*state.db).clone())
                .children(parent, &params.organization, is_root)
                .await?
        }
        TreeDoctype::CostCenter => {
            CostCenterRepository::new((*state.db).clone())
                .children(parent, &params.organization, is_root)
                .await?
        }
    };

    Ok(Json(nodes))
}
