//! Shared fixtures for ledger tests: a small school chart and entry builders.

use bursar_shared::types::{
    AccountName, CostCenterName, CurrencyCode, FiscalYearName, GlEntryId, OrganizationName,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::entry::GlEntry;
use crate::accounts::{Account, CostCenter, RootType, TreeBounds, rebuild_bounds};
use crate::fiscal::{FiscalYear, active_years_for};

pub const ORG: &str = "ACME";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn usd() -> CurrencyCode {
    "USD".parse().unwrap()
}

fn account(name: &str, parent: Option<&str>, root_type: RootType, currency: &str) -> Account {
    Account {
        name: AccountName::from(name),
        account_name: name.trim_end_matches(" - AC").to_string(),
        account_number: None,
        parent_account: parent.map(AccountName::from),
        is_group: parent.is_none(),
        root_type: Some(root_type),
        report_type: None,
        account_currency: Some(currency.parse().unwrap()),
        organization: OrganizationName::from(ORG),
        bounds: TreeBounds::default(),
        freeze_account: false,
    }
}

/// Assets (Cash, Bank in EUR, Receivables), Income (Tuition, Transport),
/// Expenses (Salaries).
pub fn school_accounts() -> Vec<Account> {
    let mut accounts = vec![
        account("Assets - AC", None, RootType::Asset, "USD"),
        account("Cash - AC", Some("Assets - AC"), RootType::Asset, "USD"),
        account("Bank EUR - AC", Some("Assets - AC"), RootType::Asset, "EUR"),
        account("Receivables - AC", Some("Assets - AC"), RootType::Asset, "USD"),
        account("Income - AC", None, RootType::Income, "USD"),
        account("Tuition Fees - AC", Some("Income - AC"), RootType::Income, "USD"),
        account("Transport Fees - AC", Some("Income - AC"), RootType::Income, "USD"),
        account("Expenses - AC", None, RootType::Expense, "USD"),
        account("Salaries - AC", Some("Expenses - AC"), RootType::Expense, "USD"),
    ];
    rebuild_bounds(&mut accounts).unwrap();
    accounts
}

/// Main (group) with Primary and Secondary leaves.
pub fn school_cost_centers() -> Vec<CostCenter> {
    let cc = |name: &str, parent: Option<&str>| CostCenter {
        name: CostCenterName::from(name),
        cost_center_name: name.to_string(),
        parent_cost_center: parent.map(CostCenterName::from),
        is_group: parent.is_none(),
        organization: OrganizationName::from(ORG),
        bounds: TreeBounds::default(),
    };
    let mut centers = vec![
        cc("Main - AC", None),
        cc("Primary - AC", Some("Main - AC")),
        cc("Secondary - AC", Some("Main - AC")),
    ];
    rebuild_bounds(&mut centers).unwrap();
    centers
}

/// Academic years 2023-2024 through 2025-2026, August to July.
pub fn academic_years() -> Vec<FiscalYear> {
    let years = (2023..=2025).map(|y| FiscalYear {
        name: FiscalYearName::new(format!("{y}-{}", y + 1)),
        start_date: date(y, 8, 1),
        end_date: date(y + 1, 7, 31),
        disabled: false,
        organizations: vec![],
    });
    active_years_for(years, None)
}

pub fn find<'a>(accounts: &'a [Account], name: &str) -> &'a Account {
    accounts.iter().find(|a| a.name.as_str() == name).unwrap()
}

/// Entry with identical organization and account currency amounts.
pub fn gl(account: &str, posting_date: NaiveDate, debit: Decimal, credit: Decimal) -> GlEntry {
    GlEntry {
        id: GlEntryId::new(),
        account: AccountName::from(account),
        posting_date,
        debit,
        credit,
        debit_in_account_currency: debit,
        credit_in_account_currency: credit,
        party_type: None,
        party: None,
        cost_center: None,
        voucher_type: "Journal Entry".to_string(),
        voucher_no: format!("JV-{posting_date}"),
        against_voucher_type: None,
        against_voucher: None,
        organization: OrganizationName::from(ORG),
        is_cancelled: false,
    }
}
