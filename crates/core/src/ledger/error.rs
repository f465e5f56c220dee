//! Ledger error types for balance and outstanding queries.

use bursar_shared::AppError;
use bursar_shared::types::{AccountName, CostCenterName, OrganizationName};
use thiserror::Error;

use crate::fiscal::FiscalYearError;

/// Errors that can occur while planning or running ledger queries.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Query Errors ==========
    /// A balance needs an account or a party.
    #[error("An account or a party is required to compute a balance")]
    MissingBalanceScope,

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountName),

    /// Cost center not found.
    #[error("Cost Center not found: {0}")]
    CostCenterNotFound(CostCenterName),

    /// Organization not found.
    #[error("Organization not found: {0}")]
    OrganizationNotFound(OrganizationName),

    /// The caller may not read the account.
    #[error("Not permitted to read Account {0}")]
    PermissionDenied(AccountName),

    // ========== Fiscal Year Errors ==========
    /// Fiscal year resolution failed.
    #[error(transparent)]
    FiscalYear(#[from] FiscalYearError),

    // ========== Database Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingBalanceScope => "MISSING_BALANCE_SCOPE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::CostCenterNotFound(_) => "COST_CENTER_NOT_FOUND",
            Self::OrganizationNotFound(_) => "ORGANIZATION_NOT_FOUND",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::FiscalYear(e) if e.is_notice() => "USER_NOTICE",
            Self::FiscalYear(_) => "FISCAL_YEAR_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed queries
            Self::MissingBalanceScope => 400,

            // 403 Forbidden - permission errors
            Self::PermissionDenied(_) => 403,

            // 404 Not Found
            Self::AccountNotFound(_)
            | Self::CostCenterNotFound(_)
            | Self::OrganizationNotFound(_) => 404,

            // 422 Unprocessable - no usable fiscal year
            Self::FiscalYear(_) => 422,

            // 500 Internal Server Error
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::FiscalYear(e) => e.into(),
            LedgerError::MissingBalanceScope => Self::Validation(err.to_string()),
            LedgerError::PermissionDenied(_) => Self::Forbidden(err.to_string()),
            LedgerError::AccountNotFound(_)
            | LedgerError::CostCenterNotFound(_)
            | LedgerError::OrganizationNotFound(_) => Self::NotFound(err.to_string()),
            LedgerError::Database(msg) => Self::Database(msg),
            LedgerError::Internal(msg) => Self::Internal(msg),
        }
    }
}
