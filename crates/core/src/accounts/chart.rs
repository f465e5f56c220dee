//! Chart-of-accounts templates.
//!
//! A template is a JSON tree keyed by account name. Each node may carry the
//! reserved property keys below; every other key is a child account.

use bursar_shared::types::AccountName;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::create::NewAccount;
use super::error::AccountError;
use super::naming::autoname_with_number;
use crate::organization::Organization;

/// Keys that describe a node instead of naming a child.
pub const RESERVED_KEYS: [&str; 6] = [
    "account_name",
    "account_number",
    "account_type",
    "root_type",
    "is_group",
    "tax_rate",
];

/// Pseudo-root shown above the top-level accounts of a template.
pub const ALL_ACCOUNTS: &str = "All Accounts";

/// A chart template as stored on disk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartTemplate {
    /// Template name.
    pub name: String,
    /// Country the template targets.
    #[serde(default)]
    pub country_code: Option<String>,
    /// Account tree, in file order.
    pub tree: Map<String, Value>,
}

/// One template node in tree-widget form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartNode {
    /// "number - name" when numbered, otherwise the name.
    pub value: String,
    /// Chart number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    /// Parent node value; `None` for top-level accounts.
    pub parent_account: Option<String>,
    /// Whether the node is a group.
    pub expandable: bool,
}

impl ChartTemplate {
    /// Parses a template from JSON.
    pub fn from_json(json: &str) -> Result<Self, AccountError> {
        serde_json::from_str(json).map_err(|e| AccountError::InvalidChart(e.to_string()))
    }

    /// Flattens the template depth-first, parents before children.
    #[must_use]
    pub fn build_tree(&self) -> Vec<ChartNode> {
        let mut nodes = Vec::new();
        collect_nodes(&self.tree, None, &mut nodes);
        nodes
    }

    /// Nodes directly under `parent`. `None` and "All Accounts" list the top level.
    #[must_use]
    pub fn coa_children(&self, parent: Option<&str>) -> Vec<ChartNode> {
        let parent = parent.filter(|p| *p != ALL_ACCOUNTS && !p.is_empty());
        self.build_tree()
            .into_iter()
            .filter(|n| n.parent_account.as_deref() == parent)
            .collect()
    }

    /// Creation requests for importing the template into `organization`,
    /// in insertion order.
    ///
    /// Top-level accounts become roots carrying their declared root type;
    /// descendants inherit it through their parent.
    pub fn to_new_accounts(
        &self,
        organization: &Organization,
    ) -> Result<Vec<NewAccount>, AccountError> {
        let mut accounts = Vec::new();
        collect_accounts(&self.tree, None, organization, &mut accounts)?;
        Ok(accounts)
    }
}

/// Child entries of a template node, skipping reserved property keys.
fn child_entries(node: &Map<String, Value>) -> impl Iterator<Item = (&String, &Value)> {
    node.iter()
        .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
}

/// Explicit `is_group` wins; otherwise any child key makes a group.
#[must_use]
pub fn identify_is_group(node: &Value) -> bool {
    let Some(props) = node.as_object() else {
        return false;
    };
    if props.get("is_group").is_some_and(truthy) {
        return true;
    }
    child_entries(props).next().is_some()
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().is_none_or(|n| n != 0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Null => false,
    }
}

fn account_number(node: &Value) -> Option<String> {
    let number = match node.get("account_number")? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!number.is_empty()).then_some(number)
}

fn collect_nodes(children: &Map<String, Value>, parent: Option<&str>, out: &mut Vec<ChartNode>) {
    for (name, child) in child_entries(children) {
        let number = account_number(child);
        let value = match &number {
            Some(n) => format!("{n} - {name}"),
            None => name.clone(),
        };
        out.push(ChartNode {
            value: value.clone(),
            account_number: number,
            parent_account: parent.map(str::to_string),
            expandable: identify_is_group(child),
        });
        if let Some(grandchildren) = child.as_object() {
            collect_nodes(grandchildren, Some(&value), out);
        }
    }
}

fn collect_accounts(
    children: &Map<String, Value>,
    parent: Option<&AccountName>,
    organization: &Organization,
    out: &mut Vec<NewAccount>,
) -> Result<(), AccountError> {
    for (name, child) in child_entries(children) {
        let Some(props) = child.as_object() else {
            return Err(AccountError::InvalidChart(format!(
                "account {name} must be an object"
            )));
        };

        let root_type = match (parent, props.get("root_type").and_then(Value::as_str)) {
            (None, Some(rt)) => Some(rt.parse().map_err(AccountError::InvalidChart)?),
            _ => None,
        };
        let number = account_number(child);
        let account_name = name.trim().to_string();
        let doc_name = AccountName::new(autoname_with_number(
            number.as_deref(),
            &account_name,
            None,
            &organization.abbr,
        ));

        out.push(NewAccount {
            account_name,
            account_number: number,
            parent_account: parent.cloned(),
            is_group: identify_is_group(child),
            is_root: parent.is_none(),
            root_type,
            organization: organization.name.clone(),
            ignore_permissions: true,
            ..NewAccount::default()
        });

        collect_accounts(props, Some(&doc_name), organization, out)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "chart_tests.rs"]
mod tests;
