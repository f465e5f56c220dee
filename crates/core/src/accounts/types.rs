//! Account and cost center types.

use std::fmt;
use std::str::FromStr;

use bursar_shared::types::{AccountName, CostCenterName, CurrencyCode, OrganizationName};
use serde::{Deserialize, Serialize};

/// Top-level classification of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootType {
    /// Asset.
    Asset,
    /// Liability.
    Liability,
    /// Equity.
    Equity,
    /// Income.
    Income,
    /// Expense.
    Expense,
}

impl RootType {
    /// All root types in chart display order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Income,
        Self::Expense,
    ];

    /// Returns the stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "Asset",
            Self::Liability => "Liability",
            Self::Equity => "Equity",
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }

    /// Report type implied by this root type.
    #[must_use]
    pub const fn report_type(self) -> ReportType {
        match self {
            Self::Asset | Self::Liability | Self::Equity => ReportType::BalanceSheet,
            Self::Income | Self::Expense => ReportType::ProfitAndLoss,
        }
    }

    /// Position in chart display order.
    #[must_use]
    pub const fn display_rank(self) -> u8 {
        match self {
            Self::Asset => 0,
            Self::Liability => 1,
            Self::Equity => 2,
            Self::Income => 3,
            Self::Expense => 4,
        }
    }
}

impl fmt::Display for RootType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RootType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|rt| rt.as_str() == s)
            .ok_or_else(|| format!("Unknown root type: {s}"))
    }
}

/// Financial statement an account reports into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportType {
    /// Cumulative balances.
    #[serde(rename = "Balance Sheet")]
    BalanceSheet,
    /// Balances scoped to the fiscal year.
    #[serde(rename = "Profit and Loss")]
    ProfitAndLoss,
}

impl ReportType {
    /// Returns the stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BalanceSheet => "Balance Sheet",
            Self::ProfitAndLoss => "Profit and Loss",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Balance Sheet" => Ok(Self::BalanceSheet),
            "Profit and Loss" => Ok(Self::ProfitAndLoss),
            other => Err(format!("Unknown report type: {other}")),
        }
    }
}

/// Nested-set ordinals. A node's subtree is every node whose bounds it contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreeBounds {
    /// Left ordinal.
    pub lft: i32,
    /// Right ordinal.
    pub rgt: i32,
}

impl TreeBounds {
    /// Creates bounds.
    #[must_use]
    pub const fn new(lft: i32, rgt: i32) -> Self {
        Self { lft, rgt }
    }

    /// Returns true if `other` lies within these bounds (inclusive).
    #[must_use]
    pub const fn contains(&self, other: Self) -> bool {
        other.lft >= self.lft && other.rgt <= self.rgt
    }
}

/// A node of the chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Document name, e.g. "1110 - Cash - ACME".
    pub name: AccountName,
    /// Display title.
    pub account_name: String,
    /// Optional chart number.
    pub account_number: Option<String>,
    /// Parent group; `None` for roots.
    pub parent_account: Option<AccountName>,
    /// Group accounts aggregate their descendants.
    pub is_group: bool,
    /// Top-level classification.
    pub root_type: Option<RootType>,
    /// Explicit report type; derived from `root_type` when absent.
    pub report_type: Option<ReportType>,
    /// Currency the account is kept in.
    pub account_currency: Option<CurrencyCode>,
    /// Owning organization.
    pub organization: OrganizationName,
    /// Nested-set bounds.
    pub bounds: TreeBounds,
    /// Frozen accounts reject new postings.
    #[serde(default)]
    pub freeze_account: bool,
}

impl Account {
    /// Report type, falling back to the one implied by the root type.
    #[must_use]
    pub fn effective_report_type(&self) -> Option<ReportType> {
        self.report_type
            .or_else(|| self.root_type.map(RootType::report_type))
    }

    /// Returns true for Profit-and-Loss accounts.
    #[must_use]
    pub fn is_profit_and_loss(&self) -> bool {
        self.effective_report_type() == Some(ReportType::ProfitAndLoss)
    }
}

/// A node of the cost center tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostCenter {
    /// Document name.
    pub name: CostCenterName,
    /// Display title.
    pub cost_center_name: String,
    /// Parent group; `None` for roots.
    pub parent_cost_center: Option<CostCenterName>,
    /// Group cost centers aggregate their descendants.
    pub is_group: bool,
    /// Owning organization.
    pub organization: OrganizationName,
    /// Nested-set bounds.
    pub bounds: TreeBounds,
}

/// A record that lives in a nested-set tree.
pub trait HierarchyNode {
    /// Document name.
    fn node_name(&self) -> &str;
    /// Parent document name, if any.
    fn parent_name(&self) -> Option<&str>;
    /// Current bounds.
    fn bounds(&self) -> TreeBounds;
    /// Replaces the bounds.
    fn set_bounds(&mut self, bounds: TreeBounds);
}

impl HierarchyNode for Account {
    fn node_name(&self) -> &str {
        self.name.as_str()
    }

    fn parent_name(&self) -> Option<&str> {
        self.parent_account
            .as_ref()
            .map(AccountName::as_str)
            .filter(|p| !p.is_empty())
    }

    fn bounds(&self) -> TreeBounds {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: TreeBounds) {
        self.bounds = bounds;
    }
}

impl HierarchyNode for CostCenter {
    fn node_name(&self) -> &str {
        self.name.as_str()
    }

    fn parent_name(&self) -> Option<&str> {
        self.parent_cost_center
            .as_ref()
            .map(CostCenterName::as_str)
            .filter(|p| !p.is_empty())
    }

    fn bounds(&self) -> TreeBounds {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: TreeBounds) {
        self.bounds = bounds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RootType::Asset, ReportType::BalanceSheet)]
    #[case(RootType::Liability, ReportType::BalanceSheet)]
    #[case(RootType::Equity, ReportType::BalanceSheet)]
    #[case(RootType::Income, ReportType::ProfitAndLoss)]
    #[case(RootType::Expense, ReportType::ProfitAndLoss)]
    fn test_report_type_from_root(#[case] root: RootType, #[case] expected: ReportType) {
        assert_eq!(root.report_type(), expected);
    }

    #[test]
    fn test_root_type_round_trips_through_str() {
        for root in RootType::ALL {
            assert_eq!(root.as_str().parse::<RootType>().unwrap(), root);
        }
        assert!("Revenue".parse::<RootType>().is_err());
    }

    #[test]
    fn test_report_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&ReportType::ProfitAndLoss).unwrap(),
            "\"Profit and Loss\""
        );
        let parsed: ReportType = serde_json::from_str("\"Balance Sheet\"").unwrap();
        assert_eq!(parsed, ReportType::BalanceSheet);
    }

    #[test]
    fn test_bounds_containment() {
        let group = TreeBounds::new(1, 10);
        assert!(group.contains(TreeBounds::new(2, 3)));
        assert!(group.contains(group));
        assert!(!group.contains(TreeBounds::new(11, 12)));
        assert!(!TreeBounds::new(2, 3).contains(group));
    }

    #[test]
    fn test_effective_report_type() {
        let mut account = Account {
            name: AccountName::from("Tuition Fees - ACME"),
            account_name: "Tuition Fees".to_string(),
            account_number: None,
            parent_account: None,
            is_group: false,
            root_type: Some(RootType::Income),
            report_type: None,
            account_currency: None,
            organization: OrganizationName::from("ACME"),
            bounds: TreeBounds::default(),
            freeze_account: false,
        };
        assert!(account.is_profit_and_loss());

        account.report_type = Some(ReportType::BalanceSheet);
        assert!(!account.is_profit_and_loss());

        account.root_type = None;
        account.report_type = None;
        assert_eq!(account.effective_report_type(), None);
    }
}
