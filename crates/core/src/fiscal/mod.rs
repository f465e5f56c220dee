//! Fiscal year management.
//!
//! - `year` - the fiscal year record and applicability rules
//! - `resolver` - date/name to fiscal year resolution and validation
//! - `filter` - filter-field description for report UIs
//! - `cache` - per-organization fiscal year cache

pub mod cache;
pub mod filter;
pub mod resolver;
pub mod year;

pub use cache::FiscalYearCache;
pub use filter::{FilterField, FilterOption, fiscal_year_filter_field};
pub use resolver::{
    FiscalYearError, FiscalYearLookup, Verbosity, correct_fiscal_year, find_fiscal_year,
    fiscal_year_start, validate_fiscal_year,
};
pub use year::{FiscalYear, active_years_for};
