//! General-ledger entry repository.
//!
//! Runs [`BalancePlan`]s in PostgreSQL. Filters are pushed into SQL; the
//! matching rows are summed in Rust so both execution paths share
//! [`BalancePlan::amount`].

use bursar_core::ledger::{
    AccountScope, BalancePlan, CostCenterScope, GlEntry, PERIOD_CLOSING_VOUCHER,
};
use bursar_shared::types::{AccountName, CostCenterName, GlEntryId, OrganizationName};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use tracing::debug;

use crate::entities::{accounts, cost_centers, gl_entries};

impl From<gl_entries::Model> for GlEntry {
    fn from(model: gl_entries::Model) -> Self {
        Self {
            id: GlEntryId::from_uuid(model.id),
            account: AccountName::from(model.account),
            posting_date: model.posting_date,
            debit: model.debit,
            credit: model.credit,
            debit_in_account_currency: model.debit_in_account_currency,
            credit_in_account_currency: model.credit_in_account_currency,
            party_type: model.party_type,
            party: model.party,
            cost_center: model.cost_center.map(CostCenterName::from),
            voucher_type: model.voucher_type,
            voucher_no: model.voucher_no,
            against_voucher_type: model.against_voucher_type,
            against_voucher: model.against_voucher,
            organization: OrganizationName::from(model.organization),
            is_cancelled: model.is_cancelled,
        }
    }
}

fn active_model(entry: &GlEntry) -> gl_entries::ActiveModel {
    gl_entries::ActiveModel {
        id: Set(entry.id.into_inner()),
        account: Set(entry.account.to_string()),
        posting_date: Set(entry.posting_date),
        debit: Set(entry.debit),
        credit: Set(entry.credit),
        debit_in_account_currency: Set(entry.debit_in_account_currency),
        credit_in_account_currency: Set(entry.credit_in_account_currency),
        party_type: Set(entry.party_type.clone()),
        party: Set(entry.party.clone()),
        cost_center: Set(entry.cost_center.as_ref().map(ToString::to_string)),
        voucher_type: Set(entry.voucher_type.clone()),
        voucher_no: Set(entry.voucher_no.clone()),
        against_voucher_type: Set(entry.against_voucher_type.clone()),
        against_voucher: Set(entry.against_voucher.clone()),
        organization: Set(entry.organization.to_string()),
        is_cancelled: Set(entry.is_cancelled),
        created_at: Set(chrono::Utc::now().into()),
    }
}

/// Applies every filter of `plan` to a GL entry query.
fn filtered(plan: &BalancePlan) -> Select<gl_entries::Entity> {
    let mut query = gl_entries::Entity::find().filter(gl_entries::Column::IsCancelled.eq(false));

    if let Some(upper) = plan.upper_bound {
        query = query.filter(gl_entries::Column::PostingDate.lte(upper));
    }
    if let Some(start) = plan.year_start {
        query = query.filter(gl_entries::Column::PostingDate.gte(start));
    }
    if plan.exclude_period_closing {
        query = query.filter(gl_entries::Column::VoucherType.ne(PERIOD_CLOSING_VOUCHER));
    }

    match &plan.account {
        None => {}
        Some(AccountScope::Exact(name)) => {
            query = query.filter(gl_entries::Column::Account.eq(name.as_str()));
        }
        Some(AccountScope::Subtree(bounds)) => {
            query = query.filter(
                gl_entries::Column::Account.in_subquery(
                    Query::select()
                        .column(accounts::Column::Name)
                        .from(accounts::Entity)
                        .and_where(accounts::Column::Lft.gte(bounds.lft))
                        .and_where(accounts::Column::Rgt.lte(bounds.rgt))
                        .to_owned(),
                ),
            );
        }
    }

    match &plan.cost_center {
        None => {}
        Some(CostCenterScope::Exact(name)) => {
            query = query.filter(gl_entries::Column::CostCenter.eq(name.as_str()));
        }
        Some(CostCenterScope::Subtree(bounds)) => {
            query = query.filter(
                gl_entries::Column::CostCenter.in_subquery(
                    Query::select()
                        .column(cost_centers::Column::Name)
                        .from(cost_centers::Entity)
                        .and_where(cost_centers::Column::Lft.gte(bounds.lft))
                        .and_where(cost_centers::Column::Rgt.lte(bounds.rgt))
                        .to_owned(),
                ),
            );
        }
    }

    if let Some(party) = &plan.party {
        query = query
            .filter(gl_entries::Column::PartyType.eq(party.party_type.as_str()))
            .filter(gl_entries::Column::Party.eq(party.party.as_str()));
    }
    if let Some(org) = &plan.organization {
        query = query.filter(gl_entries::Column::Organization.eq(org.as_str()));
    }

    query
}

/// GL entry repository.
#[derive(Debug, Clone)]
pub struct GlEntryRepository {
    db: DatabaseConnection,
}

impl GlEntryRepository {
    /// Creates a new GL entry repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts entries in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails; nothing is written then.
    pub async fn insert_many(&self, entries: &[GlEntry]) -> Result<(), DbErr> {
        let txn = self.db.begin().await?;
        for entry in entries {
            active_model(entry).insert(&txn).await?;
        }
        txn.commit().await?;
        debug!(count = entries.len(), "GL entries inserted");
        Ok(())
    }

    /// Sums the entries matching `plan`. No match gives zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn sum_for_plan(&self, plan: &BalancePlan) -> Result<Decimal, DbErr> {
        let rows: Vec<(Decimal, Decimal, Decimal, Decimal)> = filtered(plan)
            .select_only()
            .column(gl_entries::Column::Debit)
            .column(gl_entries::Column::Credit)
            .column(gl_entries::Column::DebitInAccountCurrency)
            .column(gl_entries::Column::CreditInAccountCurrency)
            .into_tuple()
            .all(&self.db)
            .await?;

        let total = rows
            .into_iter()
            .map(|(debit, credit, debit_ac, credit_ac)| {
                if plan.in_account_currency {
                    debit_ac - credit_ac
                } else {
                    debit - credit
                }
            })
            .sum();
        Ok(total)
    }

    /// Loads the entries matching `plan`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn entries_for_plan(&self, plan: &BalancePlan) -> Result<Vec<GlEntry>, DbErr> {
        Ok(filtered(plan)
            .order_by_asc(gl_entries::Column::PostingDate)
            .order_by_asc(gl_entries::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(GlEntry::from)
            .collect())
    }

    /// Loads non-cancelled entries posted on or before `as_of` against any
    /// of `vouchers`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn entries_against(
        &self,
        vouchers: &[&str],
        as_of: NaiveDate,
    ) -> Result<Vec<GlEntry>, DbErr> {
        if vouchers.is_empty() {
            return Ok(Vec::new());
        }
        Ok(gl_entries::Entity::find()
            .filter(gl_entries::Column::IsCancelled.eq(false))
            .filter(gl_entries::Column::PostingDate.lte(as_of))
            .filter(gl_entries::Column::AgainstVoucher.is_in(vouchers.iter().copied()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(GlEntry::from)
            .collect())
    }
}
