//! Preparing a new account from user input.

use bursar_shared::types::{AccountName, CurrencyCode, OrganizationName};
use serde::Deserialize;
use tracing::debug;

use super::error::AccountError;
use super::naming::{autoname_with_number, validate_field_number};
use super::types::{Account, ReportType, RootType, TreeBounds};
use crate::organization::Organization;

/// Account creation request as submitted by the tree widget.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAccount {
    /// Display title.
    pub account_name: String,
    /// Optional chart number.
    #[serde(default)]
    pub account_number: Option<String>,
    /// Explicit parent.
    #[serde(default)]
    pub parent_account: Option<AccountName>,
    /// Parent node the widget was expanded on; used when `parent_account` is empty.
    #[serde(default)]
    pub parent: Option<AccountName>,
    /// Whether the new account is a group.
    #[serde(default)]
    pub is_group: bool,
    /// Create a root account (the parent is dropped).
    #[serde(default)]
    pub is_root: bool,
    /// Root type; required for roots, inherited otherwise.
    #[serde(default)]
    pub root_type: Option<RootType>,
    /// Report type; derived from the root type when absent.
    #[serde(default)]
    pub report_type: Option<ReportType>,
    /// Account currency; defaults to the organization's.
    #[serde(default)]
    pub account_currency: Option<CurrencyCode>,
    /// Owning organization.
    pub organization: OrganizationName,
    /// Skip the create permission check.
    #[serde(default)]
    pub ignore_permissions: bool,
}

/// Validates a creation request against the existing chart and builds the account.
///
/// `existing` holds every account of `organization`. `can_create` is only
/// consulted when the request does not ignore permissions. The returned
/// account has default bounds; callers rebuild the tree after inserting it.
pub fn prepare_account(
    input: NewAccount,
    existing: &[Account],
    organization: &Organization,
    can_create: impl FnOnce() -> bool,
) -> Result<Account, AccountError> {
    if !input.ignore_permissions && !can_create() {
        return Err(AccountError::PermissionDenied("Account".to_string()));
    }

    let title = input.account_name.trim();
    if title.is_empty() {
        return Err(AccountError::EmptyName);
    }

    let parent_name = if input.is_root {
        None
    } else {
        input
            .parent_account
            .clone()
            .filter(|p| !p.as_str().is_empty())
            .or_else(|| input.parent.clone().filter(|p| !p.as_str().is_empty()))
    };

    let name = autoname_with_number(
        input.account_number.as_deref(),
        title,
        None,
        &organization.abbr,
    );

    let (root_type, report_type) = match &parent_name {
        None if !input.is_root => return Err(AccountError::ParentRequired(name)),
        None => {
            let root_type = input
                .root_type
                .ok_or_else(|| AccountError::MissingRootType(name.clone()))?;
            (root_type, input.report_type.unwrap_or(root_type.report_type()))
        }
        Some(parent_name) => {
            let parent = existing
                .iter()
                .find(|a| &a.name == parent_name)
                .ok_or_else(|| AccountError::UnknownParent {
                    name: name.clone(),
                    parent: parent_name.to_string(),
                })?;
            if parent.organization != organization.name {
                return Err(AccountError::ParentOrganizationMismatch {
                    parent: parent_name.to_string(),
                    organization: organization.name.to_string(),
                });
            }
            if !parent.is_group {
                return Err(AccountError::ParentNotGroup(parent_name.to_string()));
            }
            let root_type = parent
                .root_type
                .ok_or_else(|| AccountError::MissingRootType(parent_name.to_string()))?;
            let report_type = parent
                .effective_report_type()
                .unwrap_or(root_type.report_type());
            (root_type, report_type)
        }
    };

    if existing.iter().any(|a| a.name.as_str() == name) {
        return Err(AccountError::DuplicateName(name));
    }

    validate_field_number(
        "Account",
        &name,
        input.account_number.as_deref(),
        existing
            .iter()
            .filter(|a| a.organization == organization.name)
            .map(|a| (a.name.as_str(), a.account_number.as_deref())),
    )?;

    debug!(account = %name, parent = ?parent_name, "Prepared account");

    Ok(Account {
        name: AccountName::new(name),
        account_name: title.to_string(),
        account_number: input
            .account_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        parent_account: parent_name,
        is_group: input.is_group,
        root_type: Some(root_type),
        report_type: Some(report_type),
        account_currency: Some(
            input
                .account_currency
                .unwrap_or_else(|| organization.default_currency.clone()),
        ),
        organization: organization.name.clone(),
        bounds: TreeBounds::default(),
        freeze_account: false,
    })
}
