//! Fiscal year repository for database operations.
//!
//! Active years are served from the per-organization [`FiscalYearCache`];
//! the Fiscal Year document hooks drop the cache when a year changes.

use std::collections::HashMap;
use std::sync::Arc;

use bursar_core::fiscal::{FiscalYear, FiscalYearCache, FiscalYearError, active_years_for};
use bursar_shared::types::{FiscalYearName, OrganizationName};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::debug;

use crate::entities::{fiscal_year_organizations, fiscal_years, organizations};

/// Error types for fiscal year operations.
#[derive(Debug, thiserror::Error)]
pub enum FiscalError {
    /// Invalid dates or failed resolution.
    #[error(transparent)]
    FiscalYear(#[from] FiscalYearError),

    /// Name already taken.
    #[error("Fiscal Year {0} already exists")]
    Duplicate(String),

    /// Overlaps a year sharing at least one organization.
    #[error("Year start date or end date is overlapping with {0}. To avoid please set organization")]
    OverlappingYear(String),

    /// Restriction list names an unknown organization.
    #[error("Organization not found: {0}")]
    UnknownOrganization(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Checks if two date ranges overlap.
///
/// Two ranges [a_start, a_end] and [b_start, b_end] overlap if:
/// a_start <= b_end AND a_end >= b_start
pub fn date_ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Returns true if two years can be used by a common organization.
///
/// An empty restriction list means every organization.
pub fn share_organization(a: &FiscalYear, b: &FiscalYear) -> bool {
    a.organizations.is_empty()
        || b.organizations.is_empty()
        || a.organizations.iter().any(|org| b.organizations.contains(org))
}

/// Fiscal year repository.
#[derive(Debug, Clone)]
pub struct FiscalYearRepository {
    db: DatabaseConnection,
    cache: FiscalYearCache,
}

impl FiscalYearRepository {
    /// Creates a new fiscal year repository backed by `cache`.
    #[must_use]
    pub fn new(db: DatabaseConnection, cache: FiscalYearCache) -> Self {
        Self { db, cache }
    }

    /// Returns the shared cache.
    #[must_use]
    pub const fn cache(&self) -> &FiscalYearCache {
        &self.cache
    }

    /// Loads every fiscal year with its organization restrictions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<FiscalYear>, DbErr> {
        let years = fiscal_years::Entity::find()
            .order_by_desc(fiscal_years::Column::YearStartDate)
            .all(&self.db)
            .await?;

        let mut restrictions: HashMap<String, Vec<OrganizationName>> = HashMap::new();
        for link in fiscal_year_organizations::Entity::find()
            .order_by_asc(fiscal_year_organizations::Column::Organization)
            .all(&self.db)
            .await?
        {
            restrictions
                .entry(link.fiscal_year)
                .or_default()
                .push(OrganizationName::from(link.organization));
        }

        Ok(years
            .into_iter()
            .map(|model| {
                let organizations = restrictions.remove(&model.name).unwrap_or_default();
                FiscalYear {
                    name: FiscalYearName::from(model.name),
                    start_date: model.year_start_date,
                    end_date: model.year_end_date,
                    disabled: model.disabled,
                    organizations,
                }
            })
            .collect())
    }

    /// Returns the active years applicable to `organization`, latest start first.
    ///
    /// Served from the cache when present; otherwise loaded and cached,
    /// unless a fiscal year changed while loading.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn active_years(
        &self,
        organization: Option<&OrganizationName>,
    ) -> Result<Arc<Vec<FiscalYear>>, DbErr> {
        if let Some(years) = self.cache.get(organization) {
            return Ok(years);
        }

        let generation = self.cache.generation();
        let active = active_years_for(self.list_all().await?, organization);
        debug!(
            organization = organization.map(OrganizationName::as_str),
            count = active.len(),
            "Loaded active fiscal years"
        );
        Ok(self.cache.insert_if_current(organization, active, generation))
    }

    /// Finds a fiscal year by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, name: &FiscalYearName) -> Result<Option<FiscalYear>, DbErr> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .find(|fy| &fy.name == name))
    }

    /// Creates a fiscal year with its organization restrictions.
    ///
    /// The cache is invalidated after commit. Callers still dispatch the
    /// Fiscal Year `after_insert` event for any other registered handlers.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - start date is not before end date
    /// - the name is taken
    /// - a restriction names an unknown organization
    /// - the range overlaps a year sharing an organization
    /// - the database operation fails
    pub async fn create(&self, year: FiscalYear) -> Result<FiscalYear, FiscalError> {
        if year.start_date >= year.end_date {
            return Err(FiscalYearError::InvalidDateRange {
                start: year.start_date,
                end: year.end_date,
            }
            .into());
        }

        let existing = self.list_all().await?;
        if existing.iter().any(|fy| fy.name == year.name) {
            return Err(FiscalError::Duplicate(year.name.to_string()));
        }

        for org in &year.organizations {
            let found = organizations::Entity::find()
                .filter(organizations::Column::Name.eq(org.as_str()))
                .one(&self.db)
                .await?;
            if found.is_none() {
                return Err(FiscalError::UnknownOrganization(org.to_string()));
            }
        }

        if let Some(overlapping) = existing.iter().find(|fy| {
            !fy.disabled
                && date_ranges_overlap(year.start_date, year.end_date, fy.start_date, fy.end_date)
                && share_organization(&year, fy)
        }) {
            return Err(FiscalError::OverlappingYear(overlapping.name.to_string()));
        }

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().into();

        fiscal_years::ActiveModel {
            name: Set(year.name.to_string()),
            year_start_date: Set(year.start_date),
            year_end_date: Set(year.end_date),
            disabled: Set(year.disabled),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        for org in &year.organizations {
            fiscal_year_organizations::ActiveModel {
                fiscal_year: Set(year.name.to_string()),
                organization: Set(org.to_string()),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        self.cache.invalidate_all();
        tracing::info!(fiscal_year = %year.name, "Fiscal year created");

        Ok(year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn year(name: &str, start: NaiveDate, end: NaiveDate, orgs: &[&str]) -> FiscalYear {
        FiscalYear {
            name: FiscalYearName::from(name),
            start_date: start,
            end_date: end,
            disabled: false,
            organizations: orgs.iter().map(|o| OrganizationName::from(*o)).collect(),
        }
    }

    #[test]
    fn test_date_ranges_overlap() {
        let (a, b) = (date(2025, 8, 1), date(2026, 7, 31));
        assert!(date_ranges_overlap(a, b, date(2026, 7, 31), date(2027, 7, 31)));
        assert!(date_ranges_overlap(a, b, date(2025, 1, 1), date(2025, 8, 1)));
        assert!(!date_ranges_overlap(a, b, date(2026, 8, 1), date(2027, 7, 31)));
        assert!(!date_ranges_overlap(a, b, date(2024, 8, 1), date(2025, 7, 31)));
    }

    #[test]
    fn test_share_organization() {
        let (s, e) = (date(2025, 1, 1), date(2025, 12, 31));
        let shared = year("2025", s, e, &[]);
        let acme = year("2025 ACME", s, e, &["ACME"]);
        let other = year("2025 Other", s, e, &["Other"]);
        let both = year("2025 Both", s, e, &["ACME", "Other"]);

        assert!(share_organization(&shared, &acme));
        assert!(share_organization(&acme, &shared));
        assert!(!share_organization(&acme, &other));
        assert!(share_organization(&both, &other));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn overlap_is_symmetric(
                a in 0i64..2000, a_len in 0i64..400,
                b in 0i64..2000, b_len in 0i64..400,
            ) {
                let base = date(2020, 1, 1);
                let day = chrono::Duration::days;
                let (a_start, a_end) = (base + day(a), base + day(a + a_len));
                let (b_start, b_end) = (base + day(b), base + day(b + b_len));
                prop_assert_eq!(
                    date_ranges_overlap(a_start, a_end, b_start, b_end),
                    date_ranges_overlap(b_start, b_end, a_start, a_end)
                );
            }
        }
    }
}
