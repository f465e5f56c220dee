//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for fiscal years, balances and the account trees
//! - Caller identity middleware
//! - Chart-of-accounts template loading
//! - Error responses

pub mod charts;
pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use bursar_core::accounts::Account;
use bursar_core::fiscal::FiscalYearCache;
use bursar_core::hooks::{HookRegistry, PermissionType, Principal, ledger_hooks};
use bursar_core::ledger::currency_precision;
use bursar_db::{BalanceRepository, FiscalYearRepository};
use bursar_shared::AccountingConfig;
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use charts::ChartLibrary;
pub use error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Active fiscal years per organization.
    pub fiscal_years: FiscalYearCache,
    /// Document events, permission predicates and scheduled jobs.
    pub hooks: Arc<HookRegistry>,
    /// Accounting defaults.
    pub accounting: Arc<AccountingConfig>,
    /// Chart-of-accounts templates.
    pub charts: Arc<ChartLibrary>,
}

impl AppState {
    /// Builds the state with the accounting hooks wired to `fiscal_years`.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        fiscal_years: FiscalYearCache,
        accounting: AccountingConfig,
        charts: ChartLibrary,
    ) -> Self {
        let hooks = ledger_hooks(fiscal_years.clone());
        Self {
            db: Arc::new(db),
            fiscal_years,
            hooks: Arc::new(hooks),
            accounting: Arc::new(accounting),
            charts: Arc::new(charts),
        }
    }

    /// Currency precision used when netting outstanding amounts.
    #[must_use]
    pub fn precision(&self) -> u32 {
        currency_precision(
            self.accounting.currency_precision,
            &self.accounting.number_format,
        )
    }

    /// Fiscal year repository sharing the state's cache.
    #[must_use]
    pub fn fiscal_year_repository(&self) -> FiscalYearRepository {
        FiscalYearRepository::new((*self.db).clone(), self.fiscal_years.clone())
    }

    /// Balance repository sharing the state's cache.
    #[must_use]
    pub fn balance_repository(&self) -> BalanceRepository {
        BalanceRepository::new((*self.db).clone(), self.fiscal_years.clone())
    }

    /// Returns true if `principal` may perform `ptype` on `doctype`.
    #[must_use]
    pub fn permits(
        &self,
        doctype: &str,
        principal: &Principal,
        ptype: PermissionType,
        docname: Option<&str>,
    ) -> bool {
        self.hooks.has_permission(doctype, principal, ptype, docname)
    }

    /// Read check for individual accounts.
    #[must_use]
    pub fn account_reader<'a>(
        &'a self,
        principal: &'a Principal,
    ) -> impl Fn(&Account) -> bool + 'a {
        move |account: &Account| {
            self.permits(
                "Account",
                principal,
                PermissionType::Read,
                Some(account.name.as_str()),
            )
        }
    }
}

/// Server-local date used as "today" by balance queries.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
