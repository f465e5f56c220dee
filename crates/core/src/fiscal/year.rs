//! Fiscal year records.

use bursar_shared::types::{FiscalYearName, OrganizationName};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fiscal year definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYear {
    /// Year name (e.g., "2025-2026").
    pub name: FiscalYearName,
    /// First day of the year.
    pub start_date: NaiveDate,
    /// Last day of the year (inclusive).
    pub end_date: NaiveDate,
    /// Disabled years are never resolved.
    #[serde(default)]
    pub disabled: bool,
    /// Organizations this year is restricted to. Empty means every organization.
    #[serde(default)]
    pub organizations: Vec<OrganizationName>,
}

impl FiscalYear {
    /// Returns true if the given date falls within this year, both ends inclusive.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true if this year can be used by `organization`.
    ///
    /// Without an organization every year applies.
    #[must_use]
    pub fn applies_to(&self, organization: Option<&OrganizationName>) -> bool {
        match organization {
            None => true,
            Some(org) => self.organizations.is_empty() || self.organizations.contains(org),
        }
    }
}

/// Keeps the enabled years applicable to `organization`, latest start first.
#[must_use]
pub fn active_years_for(
    years: impl IntoIterator<Item = FiscalYear>,
    organization: Option<&OrganizationName>,
) -> Vec<FiscalYear> {
    let mut active: Vec<FiscalYear> = years
        .into_iter()
        .filter(|fy| !fy.disabled && fy.applies_to(organization))
        .collect();
    active.sort_by(|a, b| b.start_date.cmp(&a.start_date));
    active
}
