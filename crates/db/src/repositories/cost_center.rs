//! Cost center repository for database operations.

use bursar_core::Organization;
use bursar_core::accounts::{
    AccountError, CostCenter, TreeBounds, TreeNode, autoname_with_number, cost_center_children,
    rebuild_bounds,
};
use bursar_shared::types::{CostCenterName, OrganizationName};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::entities::cost_centers;

/// Advisory lock key guarding cost center tree rebuilds.
const COST_CENTER_TREE_LOCK: &str = "SELECT pg_advisory_xact_lock(7302)";

/// Error types for cost center operations.
#[derive(Debug, thiserror::Error)]
pub enum CostCenterError {
    /// Tree validation failed.
    #[error(transparent)]
    Tree(#[from] AccountError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<cost_centers::Model> for CostCenter {
    fn from(model: cost_centers::Model) -> Self {
        Self {
            name: CostCenterName::from(model.name),
            cost_center_name: model.cost_center_name,
            parent_cost_center: model.parent_cost_center.map(CostCenterName::from),
            is_group: model.is_group,
            organization: OrganizationName::from(model.organization),
            bounds: TreeBounds::new(model.lft, model.rgt),
        }
    }
}

/// Input for creating a cost center.
#[derive(Debug, Clone)]
pub struct NewCostCenter {
    /// Display title; the document name appends the organization abbreviation.
    pub cost_center_name: String,
    /// Parent group; `None` for the organization's root.
    pub parent_cost_center: Option<CostCenterName>,
    /// Group cost centers aggregate their descendants.
    pub is_group: bool,
}

/// Cost center repository.
#[derive(Debug, Clone)]
pub struct CostCenterRepository {
    db: DatabaseConnection,
}

impl CostCenterRepository {
    /// Creates a new cost center repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a cost center by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, name: &CostCenterName) -> Result<Option<CostCenter>, DbErr> {
        Ok(cost_centers::Entity::find_by_id(name.as_str())
            .one(&self.db)
            .await?
            .map(CostCenter::from))
    }

    /// Lists every cost center of an organization in tree order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_organization(
        &self,
        organization: &OrganizationName,
    ) -> Result<Vec<CostCenter>, DbErr> {
        Ok(cost_centers::Entity::find()
            .filter(cost_centers::Column::Organization.eq(organization.as_str()))
            .order_by_asc(cost_centers::Column::Lft)
            .all(&self.db)
            .await?
            .into_iter()
            .map(CostCenter::from)
            .collect())
    }

    /// Lists tree-widget children.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn children(
        &self,
        parent: Option<&str>,
        organization: &OrganizationName,
        is_root: bool,
    ) -> Result<Vec<TreeNode>, DbErr> {
        let query = if is_root {
            cost_centers::Entity::find()
                .filter(cost_centers::Column::ParentCostCenter.is_null())
                .filter(cost_centers::Column::Organization.eq(organization.as_str()))
        } else {
            cost_centers::Entity::find()
                .filter(cost_centers::Column::ParentCostCenter.eq(parent.unwrap_or_default()))
        };
        let rows: Vec<CostCenter> = query
            .order_by_asc(cost_centers::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(CostCenter::from)
            .collect();
        Ok(cost_center_children(&rows, parent, organization, is_root))
    }

    /// Inserts a cost center and rebuilds the tree bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the title is blank
    /// - the parent is missing, not a group, or in another organization
    /// - the name is taken
    /// - the database operation fails
    pub async fn create(
        &self,
        input: NewCostCenter,
        organization: &Organization,
    ) -> Result<CostCenter, CostCenterError> {
        let title = input.cost_center_name.trim();
        if title.is_empty() {
            return Err(AccountError::EmptyName.into());
        }
        let name = autoname_with_number(None, title, None, &organization.abbr);

        let txn = self.db.begin().await?;
        txn.execute_unprepared(COST_CENTER_TREE_LOCK).await?;

        if let Some(parent_name) = &input.parent_cost_center {
            let parent = cost_centers::Entity::find_by_id(parent_name.as_str())
                .one(&txn)
                .await?
                .ok_or_else(|| AccountError::UnknownParent {
                    name: name.clone(),
                    parent: parent_name.to_string(),
                })?;
            if parent.organization != organization.name.as_str() {
                return Err(AccountError::ParentOrganizationMismatch {
                    parent: parent.name,
                    organization: organization.name.to_string(),
                }
                .into());
            }
            if !parent.is_group {
                return Err(AccountError::ParentNotGroup(parent.name).into());
            }
        }

        if cost_centers::Entity::find_by_id(name.as_str())
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(AccountError::DuplicateName(name).into());
        }

        let now = chrono::Utc::now().into();
        cost_centers::ActiveModel {
            name: Set(name.clone()),
            cost_center_name: Set(title.to_string()),
            parent_cost_center: Set(input.parent_cost_center.as_ref().map(ToString::to_string)),
            is_group: Set(input.is_group),
            organization: Set(organization.name.to_string()),
            lft: Set(0),
            rgt: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        rebuild_tree(&txn).await?;

        let inserted = cost_centers::Entity::find_by_id(name.as_str())
            .one(&txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(name.clone()))?;
        txn.commit().await?;

        info!(cost_center = %name, organization = %organization.name, "Cost center created");
        Ok(CostCenter::from(inserted))
    }
}

/// Recomputes nested-set bounds for every cost center and stores the changed ones.
async fn rebuild_tree<C: ConnectionTrait>(conn: &C) -> Result<(), CostCenterError> {
    let mut all: Vec<CostCenter> = cost_centers::Entity::find()
        .all(conn)
        .await?
        .into_iter()
        .map(CostCenter::from)
        .collect();
    let before: Vec<TreeBounds> = all.iter().map(|c| c.bounds).collect();
    rebuild_bounds(&mut all)?;

    let mut updated = 0usize;
    for (cost_center, old) in all.iter().zip(before) {
        if cost_center.bounds == old {
            continue;
        }
        cost_centers::Entity::update_many()
            .col_expr(cost_centers::Column::Lft, Expr::value(cost_center.bounds.lft))
            .col_expr(cost_centers::Column::Rgt, Expr::value(cost_center.bounds.rgt))
            .filter(cost_centers::Column::Name.eq(cost_center.name.as_str()))
            .exec(conn)
            .await?;
        updated += 1;
    }

    debug!(total = all.len(), updated, "Cost center tree bounds rebuilt");
    Ok(())
}
