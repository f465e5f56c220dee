//! Organization settings.

use bursar_shared::types::{CurrencyCode, OrganizationName};
use serde::{Deserialize, Serialize};

/// An organization (school, company) owning accounts and ledger entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Unique name.
    pub name: OrganizationName,
    /// Abbreviation appended to account names ("Cash - ACME").
    pub abbr: String,
    /// Currency the organization reports in.
    pub default_currency: CurrencyCode,
}
