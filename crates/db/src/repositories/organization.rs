//! Organization repository for database operations.

use bursar_core::Organization;
use bursar_shared::types::{CurrencyCode, OrganizationName};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::organizations;

/// Error types for organization operations.
#[derive(Debug, thiserror::Error)]
pub enum OrganizationError {
    /// Name already taken.
    #[error("Organization already exists: {0}")]
    Duplicate(String),

    /// Abbreviation already used by another organization.
    #[error("Abbreviation {abbr} is already used by {other}")]
    DuplicateAbbr {
        /// Requested abbreviation.
        abbr: String,
        /// Organization holding it.
        other: String,
    },

    /// Abbreviation is blank.
    #[error("Abbreviation is mandatory")]
    MissingAbbr,

    /// Stored row cannot be mapped to the domain type.
    #[error("Invalid organization record {name}: {reason}")]
    InvalidRecord {
        /// Organization name.
        name: String,
        /// Parse failure.
        reason: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl TryFrom<organizations::Model> for Organization {
    type Error = OrganizationError;

    fn try_from(model: organizations::Model) -> Result<Self, Self::Error> {
        let default_currency = model.default_currency.parse::<CurrencyCode>().map_err(|reason| {
            OrganizationError::InvalidRecord {
                name: model.name.clone(),
                reason,
            }
        })?;
        Ok(Self {
            name: OrganizationName::from(model.name),
            abbr: model.abbr,
            default_currency,
        })
    }
}

/// Organization repository.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an organization by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the row is malformed.
    pub async fn find(
        &self,
        name: &OrganizationName,
    ) -> Result<Option<Organization>, OrganizationError> {
        organizations::Entity::find_by_id(name.as_str())
            .one(&self.db)
            .await?
            .map(Organization::try_from)
            .transpose()
    }

    /// Lists every organization by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a row is malformed.
    pub async fn list(&self) -> Result<Vec<Organization>, OrganizationError> {
        organizations::Entity::find()
            .order_by_asc(organizations::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Organization::try_from)
            .collect()
    }

    /// Checks if an organization exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn exists(&self, name: &OrganizationName) -> Result<bool, DbErr> {
        let count = organizations::Entity::find()
            .filter(organizations::Column::Name.eq(name.as_str()))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Creates an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or abbreviation is taken, or the insert fails.
    pub async fn create(&self, organization: &Organization) -> Result<Organization, OrganizationError> {
        let abbr = organization.abbr.trim();
        if abbr.is_empty() {
            return Err(OrganizationError::MissingAbbr);
        }
        if self.exists(&organization.name).await? {
            return Err(OrganizationError::Duplicate(organization.name.to_string()));
        }
        if let Some(other) = organizations::Entity::find()
            .filter(organizations::Column::Abbr.eq(abbr))
            .one(&self.db)
            .await?
        {
            return Err(OrganizationError::DuplicateAbbr {
                abbr: abbr.to_string(),
                other: other.name,
            });
        }

        let model = organizations::ActiveModel {
            name: Set(organization.name.to_string()),
            abbr: Set(abbr.to_string()),
            default_currency: Set(organization.default_currency.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let inserted = model.insert(&self.db).await?;
        tracing::info!(organization = %inserted.name, "Organization created");
        Organization::try_from(inserted)
    }
}
