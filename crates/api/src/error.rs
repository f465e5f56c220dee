//! Error responses.
//!
//! Every handler error becomes an [`AppError`] and is rendered as
//! `{error, message}` with the matching status code. User notices also
//! carry `notify: true`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bursar_core::accounts::AccountError;
use bursar_core::fiscal::FiscalYearError;
use bursar_core::hooks::HookError;
use bursar_core::ledger::LedgerError;
use bursar_db::repositories::{
    AccountRepoError, BalanceError, CostCenterError, FiscalError, OrganizationError,
};
use bursar_shared::AppError;
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

/// Handler error wrapping [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match &self.0 {
            AppError::Database(_) | AppError::Internal(_) => {
                error!(error = %self.0, "Request failed");
                "An error occurred".to_string()
            }
            other => other.to_string(),
        };

        let mut body = json!({
            "error": self.0.error_code(),
            "message": message,
        });
        if self.0.is_notice() {
            body["notify"] = json!(true);
        }

        (status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

impl From<FiscalYearError> for ApiError {
    fn from(err: FiscalYearError) -> Self {
        Self(err.into())
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(err.into())
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        Self(err.into())
    }
}

impl From<HookError> for ApiError {
    fn from(err: HookError) -> Self {
        Self(err.into())
    }
}

impl From<AccountRepoError> for ApiError {
    fn from(err: AccountRepoError) -> Self {
        match err {
            AccountRepoError::Account(e) => e.into(),
            AccountRepoError::ChartExists(_) => Self(AppError::Conflict(err.to_string())),
            AccountRepoError::InvalidRecord { .. } => Self(AppError::Internal(err.to_string())),
            AccountRepoError::Database(e) => e.into(),
        }
    }
}

impl From<CostCenterError> for ApiError {
    fn from(err: CostCenterError) -> Self {
        match err {
            CostCenterError::Tree(e) => e.into(),
            CostCenterError::Database(e) => e.into(),
        }
    }
}

impl From<FiscalError> for ApiError {
    fn from(err: FiscalError) -> Self {
        match err {
            FiscalError::FiscalYear(e) => e.into(),
            FiscalError::Duplicate(_) | FiscalError::OverlappingYear(_) => {
                Self(AppError::Conflict(err.to_string()))
            }
            FiscalError::UnknownOrganization(_) => Self(AppError::NotFound(err.to_string())),
            FiscalError::Database(e) => e.into(),
        }
    }
}

impl From<OrganizationError> for ApiError {
    fn from(err: OrganizationError) -> Self {
        match err {
            OrganizationError::Duplicate(_) | OrganizationError::DuplicateAbbr { .. } => {
                Self(AppError::Conflict(err.to_string()))
            }
            OrganizationError::MissingAbbr => Self(AppError::Validation(err.to_string())),
            OrganizationError::InvalidRecord { .. } => Self(AppError::Internal(err.to_string())),
            OrganizationError::Database(e) => e.into(),
        }
    }
}

impl From<BalanceError> for ApiError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::Ledger(e) => e.into(),
            BalanceError::Account(e) => e.into(),
            BalanceError::Organization(e) => e.into(),
            BalanceError::Database(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bursar_shared::types::AccountName;
    use http_body_util::BodyExt;
    use rstest::rstest;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_notice_carries_notify_flag() {
        let err = FiscalYearError::NotInAnyYear {
            message: "Date 01-01-2020 is not in any active Fiscal Year".to_string(),
            notify: true,
        };
        let (status, body) = render(err.into()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "USER_NOTICE");
        assert_eq!(body["notify"], true);
        assert_eq!(
            body["message"],
            "Date 01-01-2020 is not in any active Fiscal Year"
        );
    }

    #[tokio::test]
    async fn test_database_error_hides_details() {
        let (status, body) = render(DbErr::Custom("connection refused".to_string()).into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "DATABASE_ERROR");
        assert_eq!(body["message"], "An error occurred");
        assert!(body.get("notify").is_none());
    }

    #[rstest]
    #[case(LedgerError::MissingBalanceScope, StatusCode::BAD_REQUEST)]
    #[case(LedgerError::PermissionDenied(AccountName::from("Cash - AC")), StatusCode::FORBIDDEN)]
    #[case(LedgerError::AccountNotFound(AccountName::from("Nope")), StatusCode::NOT_FOUND)]
    #[tokio::test]
    async fn test_ledger_error_status(#[case] err: LedgerError, #[case] expected: StatusCode) {
        let (status, _) = render(err.into()).await;
        assert_eq!(status, expected);
    }

    #[tokio::test]
    async fn test_repository_conflicts() {
        let (status, _) = render(FiscalError::OverlappingYear("2025-2026".to_string()).into()).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = render(AccountRepoError::ChartExists("ACME".to_string()).into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
