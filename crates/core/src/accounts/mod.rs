//! Chart of accounts.
//!
//! - `types` - accounts, cost centers, root/report types, nested-set bounds
//! - `tree` - bounds rebuilding and children listing for tree widgets
//! - `naming` - account naming and number uniqueness
//! - `create` - preparing a new account from user input
//! - `chart` - chart-of-accounts templates
//! - `error` - account error types

pub mod chart;
pub mod create;
pub mod error;
pub mod naming;
pub mod tree;
pub mod types;

pub use chart::{ChartNode, ChartTemplate};
pub use create::{NewAccount, prepare_account};
pub use error::AccountError;
pub use naming::{autoname_with_number, validate_field_number};
pub use tree::{TreeDoctype, TreeNode, account_children, cost_center_children, rebuild_bounds};
pub use types::{Account, CostCenter, HierarchyNode, ReportType, RootType, TreeBounds};
