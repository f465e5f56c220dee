//! Application wiring: document events, permission predicates and scheduled jobs.
//!
//! - `principal` - the caller, roles and permission types
//! - `registry` - event handlers and permission predicates per doctype
//! - `scheduler` - jobs grouped by frequency
//! - `ledger` - the hooks the accounting module registers

pub mod error;
pub mod ledger;
pub mod principal;
pub mod registry;
pub mod scheduler;

pub use error::HookError;
pub use ledger::{ACCOUNT_DOCTYPES, FISCAL_YEAR_DOCTYPE, ledger_hooks};
pub use principal::{PermissionType, Principal, roles};
pub use registry::{DocEvent, Document, HookRegistry};
pub use scheduler::{Frequency, ScheduledJob};
