//! General-ledger entries.

use bursar_shared::types::{AccountName, CostCenterName, GlEntryId, OrganizationName};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Voucher type of year-end closing entries, excluded from P&L balances.
pub const PERIOD_CLOSING_VOUCHER: &str = "Period Closing Voucher";

/// Voucher types whose entries are always checked for settlement.
pub const ORDER_VOUCHER_TYPES: [&str; 2] = ["Sales Order", "Purchase Order"];

/// An immutable double-entry ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlEntry {
    /// Entry ID.
    pub id: GlEntryId,
    /// Posted account (always a leaf).
    pub account: AccountName,
    /// Posting date.
    pub posting_date: NaiveDate,
    /// Debit in organization currency.
    pub debit: Decimal,
    /// Credit in organization currency.
    pub credit: Decimal,
    /// Debit in account currency.
    pub debit_in_account_currency: Decimal,
    /// Credit in account currency.
    pub credit_in_account_currency: Decimal,
    /// Party type, e.g. "Student" or "Supplier".
    pub party_type: Option<String>,
    /// Party name.
    pub party: Option<String>,
    /// Cost center.
    pub cost_center: Option<CostCenterName>,
    /// Source document type.
    pub voucher_type: String,
    /// Source document name.
    pub voucher_no: String,
    /// Type of the document this entry settles.
    pub against_voucher_type: Option<String>,
    /// Document this entry settles.
    pub against_voucher: Option<String>,
    /// Owning organization.
    pub organization: OrganizationName,
    /// Cancelled entries never count.
    #[serde(default)]
    pub is_cancelled: bool,
}

impl GlEntry {
    /// Signed amount (debit minus credit) in the requested currency.
    #[must_use]
    pub fn net_amount(&self, in_account_currency: bool) -> Decimal {
        if in_account_currency {
            self.debit_in_account_currency - self.credit_in_account_currency
        } else {
            self.debit - self.credit
        }
    }

    /// Returns true if this entry references an order document.
    #[must_use]
    pub fn is_against_order(&self) -> bool {
        self.against_voucher_type
            .as_deref()
            .is_some_and(|t| ORDER_VOUCHER_TYPES.contains(&t))
    }

    /// Returns true if this is a year-end closing entry.
    #[must_use]
    pub fn is_period_closing(&self) -> bool {
        self.voucher_type == PERIOD_CLOSING_VOUCHER
    }
}
