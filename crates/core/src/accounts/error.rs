//! Chart-of-accounts error types.

use bursar_shared::AppError;
use thiserror::Error;

/// Errors raised by tree maintenance, account creation and chart templates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// Account title is blank.
    #[error("Account name is required")]
    EmptyName,

    /// Root accounts must declare a root type.
    #[error("Root type is mandatory for root account {0}")]
    MissingRootType(String),

    /// Non-root accounts must have a parent.
    #[error("Parent account is mandatory for {0}")]
    ParentRequired(String),

    /// A node references a parent that does not exist.
    #[error("{name}: parent {parent} does not exist")]
    UnknownParent {
        /// Node name.
        name: String,
        /// Missing parent name.
        parent: String,
    },

    /// Parent accounts must be groups.
    #[error("Parent account {0} is not a group")]
    ParentNotGroup(String),

    /// Parent belongs to another organization.
    #[error("Parent account {parent} does not belong to organization {organization}")]
    ParentOrganizationMismatch {
        /// Parent name.
        parent: String,
        /// Requested organization.
        organization: String,
    },

    /// Parent links form a loop.
    #[error("Cyclic parent links detected at {0}")]
    Cycle(String),

    /// An account with this name already exists.
    #[error("Account {0} already exists")]
    DuplicateName(String),

    /// Number already taken by another document.
    #[error("{doctype} Number {number} is already used in {} {other}", .doctype.to_lowercase())]
    NumberInUse {
        /// Document type, e.g. "Account".
        doctype: String,
        /// Duplicated number.
        number: String,
        /// Document already holding the number.
        other: String,
    },

    /// Organization does not exist.
    #[error("Organization not found: {0}")]
    UnknownOrganization(String),

    /// Permission predicate rejected the operation.
    #[error("Not permitted to create {0}")]
    PermissionDenied(String),

    /// Unsupported tree doctype.
    #[error("Unsupported tree doctype: {0}")]
    UnknownDoctype(String),

    /// Chart template not found.
    #[error("Chart of accounts not found: {0}")]
    UnknownChart(String),

    /// Chart template is malformed.
    #[error("Invalid chart of accounts: {0}")]
    InvalidChart(String),
}

impl AccountError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyName => "EMPTY_ACCOUNT_NAME",
            Self::MissingRootType(_) => "MISSING_ROOT_TYPE",
            Self::ParentRequired(_) => "PARENT_REQUIRED",
            Self::UnknownParent { .. } => "UNKNOWN_PARENT",
            Self::ParentNotGroup(_) => "PARENT_NOT_GROUP",
            Self::ParentOrganizationMismatch { .. } => "PARENT_ORGANIZATION_MISMATCH",
            Self::Cycle(_) => "CYCLIC_TREE",
            Self::DuplicateName(_) => "DUPLICATE_ACCOUNT",
            Self::NumberInUse { .. } => "NUMBER_IN_USE",
            Self::UnknownOrganization(_) => "ORGANIZATION_NOT_FOUND",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::UnknownDoctype(_) => "UNKNOWN_DOCTYPE",
            Self::UnknownChart(_) => "CHART_NOT_FOUND",
            Self::InvalidChart(_) => "INVALID_CHART",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::EmptyName
            | Self::MissingRootType(_)
            | Self::ParentRequired(_)
            | Self::UnknownParent { .. }
            | Self::ParentNotGroup(_)
            | Self::ParentOrganizationMismatch { .. }
            | Self::Cycle(_)
            | Self::UnknownDoctype(_)
            | Self::InvalidChart(_) => 400,
            Self::PermissionDenied(_) => 403,
            Self::UnknownOrganization(_) | Self::UnknownChart(_) => 404,
            Self::DuplicateName(_) | Self::NumberInUse { .. } => 409,
        }
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        let message = err.to_string();
        match err.http_status_code() {
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => Self::Validation(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_in_use_message() {
        let err = AccountError::NumberInUse {
            doctype: "Account".to_string(),
            number: "1110".to_string(),
            other: "1110 - Cash - ACME".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Account Number 1110 is already used in account 1110 - Cash - ACME"
        );
        assert_eq!(err.http_status_code(), 409);
        assert!(matches!(AppError::from(err), AppError::Conflict(_)));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AccountError::EmptyName.http_status_code(), 400);
        assert_eq!(
            AccountError::PermissionDenied("Account".into()).http_status_code(),
            403
        );
        assert!(matches!(
            AppError::from(AccountError::UnknownChart("Standard".into())),
            AppError::NotFound(_)
        ));
    }
}
