//! Nested-set maintenance and children listing for tree widgets.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use bursar_shared::types::{CurrencyCode, OrganizationName};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::AccountError;
use super::types::{Account, CostCenter, HierarchyNode, ReportType, RootType, TreeBounds};

/// Assigns nested-set bounds depth-first from parent links.
///
/// Roots are numbered in name order, children in name order under their parent.
/// Fails on a parent that is not in `nodes` or on a parent cycle.
pub fn rebuild_bounds<T: HierarchyNode>(nodes: &mut [T]) -> Result<(), AccountError> {
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.node_name(), i))
        .collect();

    let mut roots = Vec::new();
    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, node) in nodes.iter().enumerate() {
        match node.parent_name() {
            None => roots.push(i),
            Some(parent) => {
                let Some(&p) = index.get(parent) else {
                    return Err(AccountError::UnknownParent {
                        name: node.node_name().to_string(),
                        parent: parent.to_string(),
                    });
                };
                children.entry(p).or_default().push(i);
            }
        }
    }

    let by_name = |a: &usize, b: &usize| nodes[*a].node_name().cmp(nodes[*b].node_name());
    roots.sort_by(by_name);
    for list in children.values_mut() {
        list.sort_by(by_name);
    }

    let mut assigned = vec![TreeBounds::default(); nodes.len()];
    let mut visited = HashSet::with_capacity(nodes.len());
    let mut counter = 0;
    for root in roots {
        number_subtree(root, &children, &mut assigned, &mut visited, &mut counter);
    }

    if visited.len() != nodes.len() {
        let stuck = (0..nodes.len())
            .find(|i| !visited.contains(i))
            .map(|i| nodes[i].node_name().to_string())
            .unwrap_or_default();
        return Err(AccountError::Cycle(stuck));
    }

    for (node, bounds) in nodes.iter_mut().zip(assigned) {
        node.set_bounds(bounds);
    }
    Ok(())
}

fn number_subtree(
    node: usize,
    children: &HashMap<usize, Vec<usize>>,
    assigned: &mut [TreeBounds],
    visited: &mut HashSet<usize>,
    counter: &mut i32,
) {
    visited.insert(node);
    *counter += 1;
    let lft = *counter;
    for &child in children.get(&node).map_or(&[][..], Vec::as_slice) {
        number_subtree(child, children, assigned, visited, counter);
    }
    *counter += 1;
    assigned[node] = TreeBounds::new(lft, *counter);
}

/// Doctypes that can be browsed as a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeDoctype {
    /// Chart of accounts.
    #[serde(rename = "Account")]
    Account,
    /// Cost center tree.
    #[serde(rename = "Cost Center")]
    CostCenter,
}

impl TreeDoctype {
    /// Returns the doctype name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::CostCenter => "Cost Center",
        }
    }
}

impl fmt::Display for TreeDoctype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TreeDoctype {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Account" => Ok(Self::Account),
            "Cost Center" => Ok(Self::CostCenter),
            other => Err(AccountError::UnknownDoctype(other.to_string())),
        }
    }
}

/// One node as shown by a tree widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Document name.
    pub value: String,
    /// Whether the node can be expanded (is a group).
    pub expandable: bool,
    /// Account root type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_type: Option<RootType>,
    /// Account report type (root listings only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_type: Option<ReportType>,
    /// Account currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_currency: Option<CurrencyCode>,
    /// Parent name (child listings only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Organization currency, filled in by balance annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_currency: Option<CurrencyCode>,
    /// Balance in organization currency, filled in by balance annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
    /// Balance in account currency when it differs from the organization's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_in_account_currency: Option<Decimal>,
}

impl TreeNode {
    fn new(value: &str, expandable: bool) -> Self {
        Self {
            value: value.to_string(),
            expandable,
            root_type: None,
            report_type: None,
            account_currency: None,
            parent: None,
            organization_currency: None,
            balance: None,
            balance_in_account_currency: None,
        }
    }
}

/// Lists account children for a tree widget.
///
/// Root listings return the organization's parentless accounts; child
/// listings return the accounts under `parent`.
#[must_use]
pub fn account_children(
    accounts: &[Account],
    parent: Option<&str>,
    organization: &OrganizationName,
    is_root: bool,
) -> Vec<TreeNode> {
    let mut nodes: Vec<TreeNode> = accounts
        .iter()
        .filter(|a| {
            if is_root {
                a.parent_name().is_none() && &a.organization == organization
            } else {
                a.parent_name() == Some(parent.unwrap_or_default())
            }
        })
        .map(|a| {
            let mut node = TreeNode::new(a.name.as_str(), a.is_group);
            node.root_type = a.root_type;
            node.account_currency.clone_from(&a.account_currency);
            if is_root {
                node.report_type = a.effective_report_type();
            } else {
                node.parent = a.parent_name().map(str::to_string);
            }
            node
        })
        .collect();

    sort_account_nodes(&mut nodes, is_root);
    nodes
}

/// Lists cost center children for a tree widget.
#[must_use]
pub fn cost_center_children(
    cost_centers: &[CostCenter],
    parent: Option<&str>,
    organization: &OrganizationName,
    is_root: bool,
) -> Vec<TreeNode> {
    cost_centers
        .iter()
        .filter(|c| {
            if is_root {
                c.parent_name().is_none() && &c.organization == organization
            } else {
                c.parent_name() == Some(parent.unwrap_or_default())
            }
        })
        .map(|c| {
            let mut node = TreeNode::new(c.name.as_str(), c.is_group);
            if !is_root {
                node.parent = c.parent_name().map(str::to_string);
            }
            node
        })
        .collect()
}

/// Sorts account nodes: numbered charts by value, roots by statement then
/// root type, everything else by value.
pub fn sort_account_nodes(nodes: &mut [TreeNode], is_root: bool) {
    nodes.sort_by(|a, b| compare_account_nodes(a, b, is_root));
}

fn compare_account_nodes(a: &TreeNode, b: &TreeNode, is_root: bool) -> Ordering {
    if !is_root || starts_with_number(&a.value) {
        return a.value.cmp(&b.value);
    }

    let statement_rank = |n: &TreeNode| match n.report_type {
        Some(ReportType::BalanceSheet) => 0,
        Some(ReportType::ProfitAndLoss) => 1,
        None => 2,
    };
    let root_rank = |n: &TreeNode| n.root_type.map_or(u8::MAX, RootType::display_rank);

    statement_rank(a)
        .cmp(&statement_rank(b))
        .then_with(|| root_rank(a).cmp(&root_rank(b)))
        .then_with(|| a.value.cmp(&b.value))
}

/// True when the first word of `value` is all digits, as in "1000 - Assets".
fn starts_with_number(value: &str) -> bool {
    value
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .next()
        .is_some_and(|word| !word.is_empty() && word.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
