//! Balance and outstanding-count queries against the stored ledger.
//!
//! Loads the records a plan needs, lets `bursar-core` build the plan and
//! runs it through [`GlEntryRepository`].

use std::collections::BTreeSet;

use bursar_core::accounts::{Account, TreeNode};
use bursar_core::fiscal::FiscalYearCache;
use bursar_core::ledger::{
    BalanceContext, BalanceOutcome, BalanceQuery, BalanceService, CountQuery, LedgerError,
    OutstandingCounter, count_outstanding, needs_settlement_check, payment_amount,
};
use bursar_shared::types::{AccountName, OrganizationName};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DbErr};
use tracing::debug;

use super::account::{AccountRepoError, AccountRepository};
use super::cost_center::CostCenterRepository;
use super::fiscal::FiscalYearRepository;
use super::gl_entry::GlEntryRepository;
use super::organization::{OrganizationError, OrganizationRepository};

/// Error types for balance queries.
#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    /// Planning failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// An account row could not be loaded.
    #[error(transparent)]
    Account(#[from] AccountRepoError),

    /// An organization row could not be loaded.
    #[error(transparent)]
    Organization(#[from] OrganizationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Ledger query repository.
#[derive(Debug, Clone)]
pub struct BalanceRepository {
    organizations: OrganizationRepository,
    fiscal_years: FiscalYearRepository,
    accounts: AccountRepository,
    cost_centers: CostCenterRepository,
    gl_entries: GlEntryRepository,
}

impl BalanceRepository {
    /// Creates a new balance repository sharing `cache` for fiscal years.
    #[must_use]
    pub fn new(db: DatabaseConnection, cache: FiscalYearCache) -> Self {
        Self {
            organizations: OrganizationRepository::new(db.clone()),
            fiscal_years: FiscalYearRepository::new(db.clone(), cache),
            accounts: AccountRepository::new(db.clone()),
            cost_centers: CostCenterRepository::new(db.clone()),
            gl_entries: GlEntryRepository::new(db),
        }
    }

    /// Signed balance for `query` as of its date (today when absent).
    ///
    /// Fiscal years are resolved within the query's organization; a future
    /// date outside all of them falls back to today's year in any organization.
    ///
    /// # Errors
    ///
    /// Returns an error if planning fails (unknown account or cost center,
    /// permission, no scope, unresolvable future date) or a query fails.
    pub async fn balance_on(
        &self,
        query: &BalanceQuery,
        today: NaiveDate,
        can_read: impl FnOnce(&Account) -> bool,
    ) -> Result<Decimal, BalanceError> {
        let account = match &query.account {
            Some(name) => self.accounts.find(name).await?,
            None => None,
        };
        let currency = match &account {
            Some(acc) => self
                .organizations
                .find(&acc.organization)
                .await?
                .map(|org| org.default_currency),
            None => None,
        };
        let cost_center = match &query.cost_center {
            Some(name) => self.cost_centers.find(name).await?,
            None => None,
        };
        let years = self
            .fiscal_years
            .active_years(query.organization.as_ref())
            .await?;
        let all_years = self.fiscal_years.active_years(None).await?;

        let ctx = BalanceContext {
            account: account.as_ref(),
            account_organization_currency: currency.as_ref(),
            cost_center: cost_center.as_ref(),
            fiscal_years: &years,
            all_fiscal_years: &all_years,
            today,
        };

        match BalanceService::plan(query, &ctx, can_read)? {
            BalanceOutcome::Zero => Ok(Decimal::ZERO),
            BalanceOutcome::Plan(plan) => {
                let balance = self.gl_entries.sum_for_plan(&plan).await?;
                debug!(
                    account = query.account.as_ref().map(AccountName::as_str),
                    as_of = %plan.as_of,
                    %balance,
                    "Balance computed"
                );
                Ok(balance)
            }
        }
    }

    /// Number of entries under `query.account` counting toward `query.field`.
    ///
    /// Fiscal years are resolved across every organization.
    ///
    /// # Errors
    ///
    /// Returns an error if planning fails or a query fails.
    pub async fn count_on(
        &self,
        query: &CountQuery,
        precision: u32,
        today: NaiveDate,
        can_read: impl FnOnce(&Account) -> bool,
    ) -> Result<u64, BalanceError> {
        let account = self.accounts.find(&query.account).await?;
        let currency = match &account {
            Some(acc) => self
                .organizations
                .find(&acc.organization)
                .await?
                .map(|org| org.default_currency),
            None => None,
        };
        let years = self.fiscal_years.active_years(None).await?;

        let ctx = BalanceContext {
            account: account.as_ref(),
            account_organization_currency: currency.as_ref(),
            cost_center: None,
            fiscal_years: &years,
            all_fiscal_years: &years,
            today,
        };

        let Some(plan) = OutstandingCounter::plan(query, &ctx, can_read)? else {
            return Ok(0);
        };
        let candidates = self.gl_entries.entries_for_plan(&plan).await?;

        let payments = if query.field.needs_netting() {
            let vouchers: BTreeSet<&str> = candidates
                .iter()
                .filter(|e| needs_settlement_check(&query.field, e))
                .map(|e| e.voucher_no.as_str())
                .collect();
            let vouchers: Vec<&str> = vouchers.into_iter().collect();
            self.gl_entries
                .entries_against(&vouchers, plan.as_of)
                .await?
        } else {
            Vec::new()
        };

        let count = count_outstanding(
            &query.field,
            &candidates,
            |entry| payment_amount(&query.field, entry, &payments, plan.as_of),
            precision,
        );
        debug!(account = %query.account, candidates = candidates.len(), count, "Outstanding count computed");
        Ok(count)
    }

    /// Annotates tree nodes with organization-currency balances.
    ///
    /// Nodes whose account currency differs from the organization's also get
    /// a balance in the account currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the organization is unknown or a balance fails.
    pub async fn account_balances(
        &self,
        mut nodes: Vec<TreeNode>,
        organization: &OrganizationName,
        today: NaiveDate,
        can_read: impl Fn(&Account) -> bool,
    ) -> Result<Vec<TreeNode>, BalanceError> {
        let org = self
            .organizations
            .find(organization)
            .await?
            .ok_or_else(|| LedgerError::OrganizationNotFound(organization.clone()))?;

        for node in &mut nodes {
            let mut query = BalanceQuery::for_account(node.value.as_str())
                .in_organization(organization.clone());
            query.in_account_currency = false;

            node.organization_currency = Some(org.default_currency.clone());
            node.balance = Some(self.balance_on(&query, today, &can_read).await?);

            if node
                .account_currency
                .as_ref()
                .is_some_and(|c| c != &org.default_currency)
            {
                query.in_account_currency = true;
                node.balance_in_account_currency =
                    Some(self.balance_on(&query, today, &can_read).await?);
            }
        }

        Ok(nodes)
    }
}
