//! General-ledger queries.
//!
//! This module implements the read side of the ledger:
//! - GL entries
//! - Fiscal-year scoped balance aggregation over the nested-set chart
//! - Outstanding-document counting
//! - Currency precision
//! - Error types for ledger operations

pub mod balance;
pub mod entry;
pub mod error;
pub mod outstanding;
pub mod precision;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod test_support;

pub use balance::{
    AccountScope, BalanceContext, BalanceOutcome, BalancePlan, BalanceQuery, BalanceService,
    CostCenterScope, HierarchyIndex, PartyFilter, sum_entries,
};
pub use entry::{GlEntry, PERIOD_CLOSING_VOUCHER};
pub use error::LedgerError;
pub use outstanding::{
    CountQuery, OutstandingCounter, OutstandingField, count_outstanding, is_outstanding,
    needs_settlement_check, payment_amount,
};
pub use precision::{NumberFormat, currency_precision, number_format_info};
