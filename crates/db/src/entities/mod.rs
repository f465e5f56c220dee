//! `SeaORM` entity definitions.
//!
//! One module per table. Enum-like columns (`root_type`, `report_type`) are
//! stored as text and parsed by the repositories.

pub mod accounts;
pub mod cost_centers;
pub mod fiscal_year_organizations;
pub mod fiscal_years;
pub mod gl_entries;
pub mod organizations;

pub mod prelude {
    //! Entity re-exports.

    pub use super::accounts::Entity as Accounts;
    pub use super::cost_centers::Entity as CostCenters;
    pub use super::fiscal_year_organizations::Entity as FiscalYearOrganizations;
    pub use super::fiscal_years::Entity as FiscalYears;
    pub use super::gl_entries::Entity as GlEntries;
    pub use super::organizations::Entity as Organizations;
}
