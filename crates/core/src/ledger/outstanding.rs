//! Outstanding-document counting.
//!
//! For invoiced amounts and payables, each candidate entry is netted against
//! the payments made against its voucher and counted only while a residual
//! remains. Any other field counts every matching entry.

use bursar_shared::types::AccountName;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::balance::{
    BalanceContext, BalanceOutcome, BalancePlan, BalanceQuery, BalanceService, HierarchyIndex,
};
use super::entry::GlEntry;
use super::error::LedgerError;
use crate::accounts::Account;

/// Which figure is being counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutstandingField {
    /// Receivables: debit side, settled by credits.
    InvoicedAmount,
    /// Payables: credit side, settled by debits.
    Payables,
    /// Anything else: plain entry count.
    Other(String),
}

impl OutstandingField {
    /// Parses a field name.
    #[must_use]
    pub fn parse(fieldname: &str) -> Self {
        match fieldname {
            "invoiced_amount" => Self::InvoicedAmount,
            "payables" => Self::Payables,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns true when entries must be netted against payments.
    #[must_use]
    pub const fn needs_netting(&self) -> bool {
        matches!(self, Self::InvoicedAmount | Self::Payables)
    }

    /// `(dr_or_cr, cr_or_dr)` of an entry for this field.
    fn sides(&self, entry: &GlEntry) -> (Decimal, Decimal) {
        match self {
            Self::Payables => (entry.credit, entry.debit),
            Self::InvoicedAmount | Self::Other(_) => (entry.debit, entry.credit),
        }
    }
}

/// Whether an entry qualifies for the settlement check.
///
/// Qualifies when it references no voucher, references an order, or
/// references its own voucher with a positive amount on the counted side.
#[must_use]
pub fn needs_settlement_check(field: &OutstandingField, entry: &GlEntry) -> bool {
    let (dr_or_cr, _) = field.sides(entry);
    let against = entry.against_voucher.as_deref().filter(|v| !v.is_empty());
    against.is_none()
        || entry.is_against_order()
        || (against == Some(entry.voucher_no.as_str()) && dr_or_cr > Decimal::ZERO)
}

/// Payments made against `entry`'s voucher by the same party, up to `as_of`.
///
/// Invoiced amounts are settled by `credit - debit`, payables by `debit - credit`.
#[must_use]
pub fn payment_amount<'a>(
    field: &OutstandingField,
    entry: &GlEntry,
    ledger: impl IntoIterator<Item = &'a GlEntry>,
    as_of: NaiveDate,
) -> Decimal {
    let Some(party) = entry.party.as_deref() else {
        return Decimal::ZERO;
    };
    ledger
        .into_iter()
        .filter(|p| {
            !p.is_cancelled
                && p.posting_date <= as_of
                && p.against_voucher.as_deref() == Some(entry.voucher_no.as_str())
                && p.party.as_deref() == Some(party)
                && p.id != entry.id
        })
        .map(|p| match field {
            OutstandingField::Payables => p.debit - p.credit,
            _ => p.credit - p.debit,
        })
        .sum()
}

/// Returns true if `outstanding` exceeds `0.1 / 10^precision`.
#[must_use]
pub fn is_outstanding(outstanding: Decimal, precision: u32) -> bool {
    let epsilon = Decimal::new(1, precision.min(27) + 1);
    outstanding.abs() > epsilon
}

/// Counts `entries` (already filtered by the plan) for `field`.
///
/// `payments` returns the settled amount for an entry.
pub fn count_outstanding<'a>(
    field: &OutstandingField,
    entries: impl IntoIterator<Item = &'a GlEntry>,
    mut payments: impl FnMut(&GlEntry) -> Decimal,
    precision: u32,
) -> u64 {
    let mut count = 0;
    for entry in entries {
        if !field.needs_netting() {
            count += 1;
            continue;
        }
        if !needs_settlement_check(field, entry) {
            continue;
        }
        let (dr_or_cr, cr_or_dr) = field.sides(entry);
        let outstanding = dr_or_cr - cr_or_dr - payments(entry);
        if is_outstanding(outstanding, precision) {
            count += 1;
        }
    }
    count
}

/// Per-account document count request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountQuery {
    /// Account (leaf or group).
    pub account: AccountName,
    /// Counted figure.
    pub field: OutstandingField,
    /// As-of date; today and no upper bound when absent.
    pub date: Option<NaiveDate>,
}

/// Counter for the tree widget's per-account document counts.
pub struct OutstandingCounter;

impl OutstandingCounter {
    /// Plans the candidate entry set for the query's account.
    ///
    /// Same date and fiscal year handling as balances, without organization,
    /// party or cost center filters. The account read permission is always
    /// checked. `None` means the date predates every fiscal year.
    pub fn plan(
        query: &CountQuery,
        ctx: &BalanceContext<'_>,
        can_read: impl FnOnce(&Account) -> bool,
    ) -> Result<Option<BalancePlan>, LedgerError> {
        let balance_query = BalanceQuery {
            account: Some(query.account.clone()),
            date: query.date,
            ..BalanceQuery::default()
        };
        Ok(match BalanceService::plan(&balance_query, ctx, can_read)? {
            BalanceOutcome::Zero => None,
            BalanceOutcome::Plan(plan) => Some(plan),
        })
    }

    /// Plans and counts over an in-memory ledger.
    pub fn count(
        query: &CountQuery,
        ctx: &BalanceContext<'_>,
        ledger: &[GlEntry],
        index: &HierarchyIndex,
        precision: u32,
        can_read: impl FnOnce(&Account) -> bool,
    ) -> Result<u64, LedgerError> {
        let Some(plan) = Self::plan(query, ctx, can_read)? else {
            return Ok(0);
        };
        let candidates = ledger.iter().filter(|e| plan.matches(e, index));
        Ok(count_outstanding(
            &query.field,
            candidates,
            |entry| payment_amount(&query.field, entry, ledger, plan.as_of),
            precision,
        ))
    }
}

#[cfg(test)]
#[path = "outstanding_tests.rs"]
mod tests;
