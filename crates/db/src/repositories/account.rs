//! Chart-of-accounts repository for database operations.
//!
//! Bounds are rebuilt for the whole tree after every insert, under a
//! transaction-scoped advisory lock so concurrent inserts serialize.

use bursar_core::Organization;
use bursar_core::accounts::{
    Account, AccountError, ChartTemplate, NewAccount, ReportType, RootType, TreeBounds, TreeNode,
    account_children, prepare_account, rebuild_bounds,
};
use bursar_shared::types::{AccountName, CurrencyCode, OrganizationName};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::entities::accounts;

/// Advisory lock key guarding account tree rebuilds.
const ACCOUNT_TREE_LOCK: &str = "SELECT pg_advisory_xact_lock(7301)";

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountRepoError {
    /// Domain validation failed.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// The organization already has a chart of accounts.
    #[error("Chart of accounts already exists for organization {0}")]
    ChartExists(String),

    /// Stored row cannot be mapped to the domain type.
    #[error("Invalid account record {name}: {reason}")]
    InvalidRecord {
        /// Account name.
        name: String,
        /// Parse failure.
        reason: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl TryFrom<accounts::Model> for Account {
    type Error = AccountRepoError;

    fn try_from(model: accounts::Model) -> Result<Self, Self::Error> {
        let invalid = |reason: String| AccountRepoError::InvalidRecord {
            name: model.name.clone(),
            reason,
        };
        let root_type = model
            .root_type
            .as_deref()
            .map(str::parse::<RootType>)
            .transpose()
            .map_err(invalid)?;
        let report_type = model
            .report_type
            .as_deref()
            .map(str::parse::<ReportType>)
            .transpose()
            .map_err(invalid)?;
        let account_currency = model
            .account_currency
            .as_deref()
            .map(str::parse::<CurrencyCode>)
            .transpose()
            .map_err(invalid)?;

        Ok(Self {
            name: AccountName::from(model.name),
            account_name: model.account_name,
            account_number: model.account_number,
            parent_account: model.parent_account.map(AccountName::from),
            is_group: model.is_group,
            root_type,
            report_type,
            account_currency,
            organization: OrganizationName::from(model.organization),
            bounds: TreeBounds::new(model.lft, model.rgt),
            freeze_account: model.freeze_account,
        })
    }
}

fn active_model(account: &Account) -> accounts::ActiveModel {
    let now = chrono::Utc::now().into();
    accounts::ActiveModel {
        name: Set(account.name.to_string()),
        account_name: Set(account.account_name.clone()),
        account_number: Set(account.account_number.clone()),
        parent_account: Set(account.parent_account.as_ref().map(ToString::to_string)),
        is_group: Set(account.is_group),
        root_type: Set(account.root_type.map(|rt| rt.as_str().to_string())),
        report_type: Set(account.report_type.map(|rt| rt.as_str().to_string())),
        account_currency: Set(account.account_currency.as_ref().map(ToString::to_string)),
        organization: Set(account.organization.to_string()),
        lft: Set(account.bounds.lft),
        rgt: Set(account.bounds.rgt),
        freeze_account: Set(account.freeze_account),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

fn to_accounts(models: Vec<accounts::Model>) -> Result<Vec<Account>, AccountRepoError> {
    models.into_iter().map(Account::try_from).collect()
}

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an account by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the row is malformed.
    pub async fn find(&self, name: &AccountName) -> Result<Option<Account>, AccountRepoError> {
        accounts::Entity::find_by_id(name.as_str())
            .one(&self.db)
            .await?
            .map(Account::try_from)
            .transpose()
    }

    /// Lists every account of an organization in tree order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a row is malformed.
    pub async fn list_for_organization(
        &self,
        organization: &OrganizationName,
    ) -> Result<Vec<Account>, AccountRepoError> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::Organization.eq(organization.as_str()))
            .order_by_asc(accounts::Column::Lft)
            .all(&self.db)
            .await?;
        to_accounts(models)
    }

    /// Lists tree-widget children.
    ///
    /// Root listings return the organization's parentless accounts; child
    /// listings return the accounts under `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a row is malformed.
    pub async fn children(
        &self,
        parent: Option<&str>,
        organization: &OrganizationName,
        is_root: bool,
    ) -> Result<Vec<TreeNode>, AccountRepoError> {
        let query = if is_root {
            accounts::Entity::find()
                .filter(accounts::Column::ParentAccount.is_null())
                .filter(accounts::Column::Organization.eq(organization.as_str()))
        } else {
            accounts::Entity::find()
                .filter(accounts::Column::ParentAccount.eq(parent.unwrap_or_default()))
        };
        let rows = to_accounts(query.all(&self.db).await?)?;
        Ok(account_children(&rows, parent, organization, is_root))
    }

    /// Validates and inserts a new account, then rebuilds the tree bounds.
    ///
    /// `can_create` is only consulted when the request does not ignore
    /// permissions.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the database operation fails.
    pub async fn create(
        &self,
        input: NewAccount,
        organization: &Organization,
        can_create: impl FnOnce() -> bool,
    ) -> Result<Account, AccountRepoError> {
        let txn = self.db.begin().await?;
        txn.execute_unprepared(ACCOUNT_TREE_LOCK).await?;

        let existing = to_accounts(
            accounts::Entity::find()
                .filter(accounts::Column::Organization.eq(organization.name.as_str()))
                .all(&txn)
                .await?,
        )?;
        let account = prepare_account(input, &existing, organization, can_create)?;
        if accounts::Entity::find_by_id(account.name.as_str())
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(AccountError::DuplicateName(account.name.to_string()).into());
        }

        active_model(&account).insert(&txn).await?;
        rebuild_tree(&txn).await?;

        let inserted = accounts::Entity::find_by_id(account.name.as_str())
            .one(&txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(account.name.to_string()))?;
        txn.commit().await?;

        info!(account = %account.name, organization = %organization.name, "Account created");
        Account::try_from(inserted)
    }

    /// Imports a chart template into an organization without accounts.
    ///
    /// Permissions are not checked per account; callers authorize the import.
    ///
    /// # Errors
    ///
    /// Returns an error if the organization already has accounts, a template
    /// account fails validation, or the database operation fails.
    pub async fn import_chart(
        &self,
        template: &ChartTemplate,
        organization: &Organization,
    ) -> Result<Vec<Account>, AccountRepoError> {
        let requests = template.to_new_accounts(organization)?;

        let txn = self.db.begin().await?;
        txn.execute_unprepared(ACCOUNT_TREE_LOCK).await?;

        let existing = accounts::Entity::find()
            .filter(accounts::Column::Organization.eq(organization.name.as_str()))
            .count(&txn)
            .await?;
        if existing > 0 {
            return Err(AccountRepoError::ChartExists(organization.name.to_string()));
        }

        let mut created: Vec<Account> = Vec::with_capacity(requests.len());
        for request in requests {
            let account = prepare_account(request, &created, organization, || true)?;
            created.push(account);
        }
        for account in &created {
            active_model(account).insert(&txn).await?;
        }
        rebuild_tree(&txn).await?;

        let imported = to_accounts(
            accounts::Entity::find()
                .filter(accounts::Column::Organization.eq(organization.name.as_str()))
                .order_by_asc(accounts::Column::Lft)
                .all(&txn)
                .await?,
        )?;
        txn.commit().await?;

        info!(
            chart = %template.name,
            organization = %organization.name,
            count = imported.len(),
            "Chart of accounts imported"
        );
        Ok(imported)
    }
}

/// Recomputes nested-set bounds for every account and stores the changed ones.
async fn rebuild_tree<C: ConnectionTrait>(conn: &C) -> Result<(), AccountRepoError> {
    let mut all = to_accounts(accounts::Entity::find().all(conn).await?)?;
    let before: Vec<TreeBounds> = all.iter().map(|a| a.bounds).collect();
    rebuild_bounds(&mut all)?;

    let mut updated = 0usize;
    for (account, old) in all.iter().zip(before) {
        if account.bounds == old {
            continue;
        }
        accounts::Entity::update_many()
            .col_expr(accounts::Column::Lft, Expr::value(account.bounds.lft))
            .col_expr(accounts::Column::Rgt, Expr::value(account.bounds.rgt))
            .filter(accounts::Column::Name.eq(account.name.as_str()))
            .exec(conn)
            .await?;
        updated += 1;
    }

    debug!(total = all.len(), updated, "Account tree bounds rebuilt");
    Ok(())
}
