//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod balance;
pub mod cost_center;
pub mod fiscal;
pub mod gl_entry;
pub mod organization;

pub use account::{AccountRepoError, AccountRepository};
pub use balance::{BalanceError, BalanceRepository};
pub use cost_center::{CostCenterError, CostCenterRepository, NewCostCenter};
pub use fiscal::{FiscalError, FiscalYearRepository, date_ranges_overlap, share_organization};
pub use gl_entry::GlEntryRepository;
pub use organization::{OrganizationError, OrganizationRepository};
