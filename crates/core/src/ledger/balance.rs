//! Fiscal-year scoped balance aggregation over the nested-set chart.
//!
//! `BalanceService::plan` turns a `BalanceQuery` into a `BalancePlan`: the
//! filter set every contributing entry must satisfy. The plan is executed
//! either in memory (`sum_entries`) or by the database layer.

use std::collections::HashMap;

use bursar_shared::types::{AccountName, CostCenterName, CurrencyCode, OrganizationName};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use super::entry::GlEntry;
use super::error::LedgerError;
use crate::accounts::{Account, CostCenter, ReportType, TreeBounds};
use crate::fiscal::{FiscalYear, fiscal_year_start};

/// Balance request.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceQuery {
    /// Account (leaf or group).
    #[serde(default)]
    pub account: Option<AccountName>,
    /// As-of date; today and no upper bound when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Party type; only used together with `party`.
    #[serde(default)]
    pub party_type: Option<String>,
    /// Party name; only used together with `party_type`.
    #[serde(default)]
    pub party: Option<String>,
    /// Restrict to one organization.
    #[serde(default)]
    pub organization: Option<OrganizationName>,
    /// Sum account-currency columns instead of organization currency.
    #[serde(default = "default_in_account_currency")]
    pub in_account_currency: bool,
    /// Cost center; only applies to Profit-and-Loss accounts.
    #[serde(default)]
    pub cost_center: Option<CostCenterName>,
    /// Skip the account read permission check.
    #[serde(default)]
    pub ignore_account_permission: bool,
}

fn default_in_account_currency() -> bool {
    true
}

impl Default for BalanceQuery {
    fn default() -> Self {
        Self {
            account: None,
            date: None,
            party_type: None,
            party: None,
            organization: None,
            in_account_currency: true,
            cost_center: None,
            ignore_account_permission: false,
        }
    }
}

impl BalanceQuery {
    /// Query for one account.
    #[must_use]
    pub fn for_account(account: impl Into<AccountName>) -> Self {
        Self {
            account: Some(account.into()),
            ..Self::default()
        }
    }

    /// Sets the as-of date.
    #[must_use]
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Restricts to an organization.
    #[must_use]
    pub fn in_organization(mut self, organization: impl Into<OrganizationName>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Party filter, when both halves are present.
    #[must_use]
    pub fn party_filter(&self) -> Option<PartyFilter> {
        match (&self.party_type, &self.party) {
            (Some(party_type), Some(party)) if !party_type.is_empty() && !party.is_empty() => {
                Some(PartyFilter {
                    party_type: party_type.clone(),
                    party: party.clone(),
                })
            }
            _ => None,
        }
    }
}

/// Party equality filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyFilter {
    /// Party type.
    pub party_type: String,
    /// Party name.
    pub party: String,
}

/// Account filter of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountScope {
    /// Every account inside a group's bounds.
    Subtree(TreeBounds),
    /// A single leaf account.
    Exact(AccountName),
}

/// Cost center filter of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CostCenterScope {
    /// Every cost center inside a group's bounds.
    Subtree(TreeBounds),
    /// A single leaf cost center.
    Exact(CostCenterName),
}

/// Looked-up records a plan is built against.
#[derive(Debug, Clone, Copy)]
pub struct BalanceContext<'a> {
    /// The queried account, if any.
    pub account: Option<&'a Account>,
    /// Default currency of the account's organization.
    pub account_organization_currency: Option<&'a CurrencyCode>,
    /// The queried cost center, if any.
    pub cost_center: Option<&'a CostCenter>,
    /// Active fiscal years of the queried organization, latest start first.
    pub fiscal_years: &'a [FiscalYear],
    /// Active fiscal years of every organization, latest start first.
    ///
    /// Future dates outside every scoped year fall back to today's year here.
    pub all_fiscal_years: &'a [FiscalYear],
    /// Current date.
    pub today: NaiveDate,
}

/// Filters and sum column of one balance computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancePlan {
    /// Date fiscal year resolution ran against.
    pub as_of: NaiveDate,
    /// `posting_date <= upper_bound`, only when a date was given.
    pub upper_bound: Option<NaiveDate>,
    /// `posting_date >= year_start` for Profit-and-Loss accounts.
    pub year_start: Option<NaiveDate>,
    /// Drop period closing vouchers (Profit-and-Loss accounts).
    pub exclude_period_closing: bool,
    /// Account filter.
    pub account: Option<AccountScope>,
    /// Cost center filter.
    pub cost_center: Option<CostCenterScope>,
    /// Party filter.
    pub party: Option<PartyFilter>,
    /// Organization filter.
    pub organization: Option<OrganizationName>,
    /// Sum account-currency columns.
    pub in_account_currency: bool,
}

/// Result of planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceOutcome {
    /// The date predates every fiscal year; the balance is zero.
    Zero,
    /// Run the plan.
    Plan(BalancePlan),
}

/// Nested-set bounds of accounts and cost centers by name.
#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    accounts: HashMap<String, TreeBounds>,
    cost_centers: HashMap<String, TreeBounds>,
}

impl HierarchyIndex {
    /// Indexes the given records.
    #[must_use]
    pub fn new(accounts: &[Account], cost_centers: &[CostCenter]) -> Self {
        Self {
            accounts: accounts
                .iter()
                .map(|a| (a.name.to_string(), a.bounds))
                .collect(),
            cost_centers: cost_centers
                .iter()
                .map(|c| (c.name.to_string(), c.bounds))
                .collect(),
        }
    }

    /// Bounds of an account.
    #[must_use]
    pub fn account_bounds(&self, name: &AccountName) -> Option<TreeBounds> {
        self.accounts.get(name.as_str()).copied()
    }

    /// Bounds of a cost center.
    #[must_use]
    pub fn cost_center_bounds(&self, name: &CostCenterName) -> Option<TreeBounds> {
        self.cost_centers.get(name.as_str()).copied()
    }
}

impl BalancePlan {
    /// Returns true if `entry` contributes to the balance.
    #[must_use]
    pub fn matches(&self, entry: &GlEntry, index: &HierarchyIndex) -> bool {
        if entry.is_cancelled {
            return false;
        }
        if self.upper_bound.is_some_and(|d| entry.posting_date > d) {
            return false;
        }
        if self.year_start.is_some_and(|d| entry.posting_date < d) {
            return false;
        }
        if self.exclude_period_closing && entry.is_period_closing() {
            return false;
        }

        let account_ok = match &self.account {
            None => true,
            Some(AccountScope::Exact(name)) => &entry.account == name,
            Some(AccountScope::Subtree(bounds)) => index
                .account_bounds(&entry.account)
                .is_some_and(|b| bounds.contains(b)),
        };
        let cost_center_ok = match &self.cost_center {
            None => true,
            Some(CostCenterScope::Exact(name)) => entry.cost_center.as_ref() == Some(name),
            Some(CostCenterScope::Subtree(bounds)) => entry
                .cost_center
                .as_ref()
                .and_then(|cc| index.cost_center_bounds(cc))
                .is_some_and(|b| bounds.contains(b)),
        };
        let party_ok = self.party.as_ref().is_none_or(|p| {
            entry.party_type.as_deref() == Some(p.party_type.as_str())
                && entry.party.as_deref() == Some(p.party.as_str())
        });
        let organization_ok = self
            .organization
            .as_ref()
            .is_none_or(|org| &entry.organization == org);

        account_ok && cost_center_ok && party_ok && organization_ok
    }

    /// Contribution of one matching entry.
    #[must_use]
    pub fn amount(&self, entry: &GlEntry) -> Decimal {
        entry.net_amount(self.in_account_currency)
    }
}

/// Sums the contributions of every entry matching `plan`. No match gives zero.
pub fn sum_entries<'a>(
    plan: &BalancePlan,
    entries: impl IntoIterator<Item = &'a GlEntry>,
    index: &HierarchyIndex,
) -> Decimal {
    entries
        .into_iter()
        .filter(|e| plan.matches(e, index))
        .map(|e| plan.amount(e))
        .sum()
}

/// Balance planning.
pub struct BalanceService;

impl BalanceService {
    /// Builds the plan for `query`.
    ///
    /// `can_read` is asked whether the caller may read the account, unless
    /// the query ignores account permissions.
    pub fn plan(
        query: &BalanceQuery,
        ctx: &BalanceContext<'_>,
        can_read: impl FnOnce(&Account) -> bool,
    ) -> Result<BalanceOutcome, LedgerError> {
        let account = match (&query.account, ctx.account) {
            (Some(name), None) => return Err(LedgerError::AccountNotFound(name.clone())),
            (Some(_), Some(acc)) => Some(acc),
            (None, _) => None,
        };

        let as_of = query.date.unwrap_or(ctx.today);
        let Some(year_start) = fiscal_year_start(
            ctx.fiscal_years,
            ctx.all_fiscal_years,
            as_of,
            ctx.today,
            query.organization.as_ref(),
        )?
        else {
            debug!(%as_of, "Date predates every fiscal year, balance is zero");
            return Ok(BalanceOutcome::Zero);
        };

        let report_type = account.and_then(Account::effective_report_type);
        let is_profit_and_loss = report_type == Some(ReportType::ProfitAndLoss);

        let cost_center = match (&query.cost_center, is_profit_and_loss) {
            (Some(name), true) => {
                let cc = ctx
                    .cost_center
                    .ok_or_else(|| LedgerError::CostCenterNotFound(name.clone()))?;
                Some(if cc.is_group {
                    CostCenterScope::Subtree(cc.bounds)
                } else {
                    CostCenterScope::Exact(name.clone())
                })
            }
            _ => None,
        };

        let mut in_account_currency = query.in_account_currency;
        let mut account_scope = None;
        if let Some(acc) = account {
            if !query.ignore_account_permission && !can_read(acc) {
                return Err(LedgerError::PermissionDenied(acc.name.clone()));
            }
            if acc.is_group {
                account_scope = Some(AccountScope::Subtree(acc.bounds));
                if acc.account_currency.is_some()
                    && acc.account_currency.as_ref() == ctx.account_organization_currency
                {
                    in_account_currency = false;
                }
            } else {
                account_scope = Some(AccountScope::Exact(acc.name.clone()));
            }
        }

        let party = query.party_filter();
        if account.is_none() && party.is_none() {
            return Err(LedgerError::MissingBalanceScope);
        }

        Ok(BalanceOutcome::Plan(BalancePlan {
            as_of,
            upper_bound: query.date,
            year_start: is_profit_and_loss.then_some(year_start),
            exclude_period_closing: is_profit_and_loss,
            account: account_scope,
            cost_center,
            party,
            organization: query.organization.clone(),
            in_account_currency,
        }))
    }

    /// Plans and sums `query` over in-memory entries.
    pub fn balance<'a>(
        query: &BalanceQuery,
        ctx: &BalanceContext<'_>,
        entries: impl IntoIterator<Item = &'a GlEntry>,
        index: &HierarchyIndex,
        can_read: impl FnOnce(&Account) -> bool,
    ) -> Result<Decimal, LedgerError> {
        match Self::plan(query, ctx, can_read)? {
            BalanceOutcome::Zero => Ok(Decimal::ZERO),
            BalanceOutcome::Plan(plan) => Ok(sum_entries(&plan, entries, index)),
        }
    }
}

#[cfg(test)]
#[path = "balance_tests.rs"]
mod tests;
