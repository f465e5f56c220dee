//! Property-based tests for balance aggregation.
//!
//! - Group balance equals the sum of its leaf balances
//! - Profit-and-Loss balances only see the resolved fiscal year
//! - Dates before every fiscal year give a zero balance

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{BalanceContext, BalanceQuery, BalanceService, HierarchyIndex};
use super::entry::GlEntry;
use super::test_support::{academic_years, date, gl, school_accounts, usd};
use crate::accounts::Account;
use crate::fiscal::FiscalYear;

const LEAVES: [&str; 6] = [
    "Cash - AC",
    "Bank EUR - AC",
    "Receivables - AC",
    "Tuition Fees - AC",
    "Transport Fees - AC",
    "Salaries - AC",
];

/// Dates between 2023-08-01 and 2026-07-31.
fn posting_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..1095).prop_map(|d| date(2023, 8, 1) + Duration::days(d))
}

/// Strategy to generate amounts (0.00 to 10,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn entry() -> impl Strategy<Value = GlEntry> {
    (0usize..LEAVES.len(), posting_date(), amount(), amount(), any::<bool>()).prop_map(
        |(leaf, day, debit, credit, cancelled)| {
            let mut e = gl(LEAVES[leaf], day, debit, credit);
            e.is_cancelled = cancelled;
            e
        },
    )
}

fn balance(
    accounts: &[Account],
    years: &[FiscalYear],
    entries: &[GlEntry],
    account: &str,
    on: NaiveDate,
) -> Decimal {
    let index = HierarchyIndex::new(accounts, &[]);
    let currency = usd();
    let query = BalanceQuery::for_account(account).on(on);
    let ctx = BalanceContext {
        account: accounts.iter().find(|a| a.name.as_str() == account),
        account_organization_currency: Some(&currency),
        cost_center: None,
        fiscal_years: years,
        all_fiscal_years: years,
        today: date(2026, 7, 31),
    };
    BalanceService::balance(&query, &ctx, entries, &index, |_| true).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_group_equals_sum_of_leaves(
        entries in prop::collection::vec(entry(), 0..40),
        on in posting_date(),
    ) {
        let accounts = school_accounts();
        let years = academic_years();

        for (group, leaves) in [
            ("Assets - AC", &LEAVES[0..3]),
            ("Income - AC", &LEAVES[3..5]),
        ] {
            let group_total = balance(&accounts, &years, &entries, group, on);
            let leaf_total: Decimal = leaves
                .iter()
                .map(|leaf| balance(&accounts, &years, &entries, leaf, on))
                .sum();
            prop_assert_eq!(group_total, leaf_total);
        }
    }

    #[test]
    fn prop_profit_and_loss_scoped_to_year(
        entries in prop::collection::vec(entry(), 0..40),
        on in posting_date(),
    ) {
        let accounts = school_accounts();
        let years = academic_years();
        let year = years.iter().find(|fy| fy.contains(on)).unwrap();

        let expected: Decimal = entries
            .iter()
            .filter(|e| {
                e.account.as_str() == "Tuition Fees - AC"
                    && !e.is_cancelled
                    && e.posting_date >= year.start_date
                    && e.posting_date <= on
            })
            .map(|e| e.debit - e.credit)
            .sum();

        prop_assert_eq!(
            balance(&accounts, &years, &entries, "Tuition Fees - AC", on),
            expected
        );
    }

    #[test]
    fn prop_date_before_all_years_is_zero(
        entries in prop::collection::vec(entry(), 0..20),
        days_before in 1i64..3000,
    ) {
        let accounts = school_accounts();
        let years = academic_years();
        let on = date(2023, 8, 1) - Duration::days(days_before);

        for account in ["Cash - AC", "Assets - AC", "Tuition Fees - AC"] {
            prop_assert_eq!(balance(&accounts, &years, &entries, account, on), Decimal::ZERO);
        }
    }
}
