use super::*;
use bursar_shared::types::{AccountName, CostCenterName};
use proptest::prelude::*;

fn account(name: &str, parent: Option<&str>, root_type: RootType, is_group: bool) -> Account {
    Account {
        name: AccountName::from(name),
        account_name: name.to_string(),
        account_number: None,
        parent_account: parent.map(AccountName::from),
        is_group,
        root_type: Some(root_type),
        report_type: None,
        account_currency: Some("USD".parse().unwrap()),
        organization: OrganizationName::from("ACME"),
        bounds: TreeBounds::default(),
        freeze_account: false,
    }
}

fn cost_center(name: &str, parent: Option<&str>, is_group: bool) -> CostCenter {
    CostCenter {
        name: CostCenterName::from(name),
        cost_center_name: name.to_string(),
        parent_cost_center: parent.map(CostCenterName::from),
        is_group,
        organization: OrganizationName::from("ACME"),
        bounds: TreeBounds::default(),
    }
}

fn sample_chart() -> Vec<Account> {
    vec![
        account("Income - ACME", None, RootType::Income, true),
        account("Tuition - ACME", Some("Income - ACME"), RootType::Income, false),
        account("Assets - ACME", None, RootType::Asset, true),
        account("Cash - ACME", Some("Assets - ACME"), RootType::Asset, false),
        account("Bank - ACME", Some("Assets - ACME"), RootType::Asset, false),
        account("Expenses - ACME", None, RootType::Expense, true),
        account("Equity - ACME", None, RootType::Equity, true),
        account("Liabilities - ACME", None, RootType::Liability, true),
    ]
}

fn bounds_of(accounts: &[Account], name: &str) -> TreeBounds {
    accounts.iter().find(|a| a.name.as_str() == name).unwrap().bounds
}

#[test]
fn test_rebuild_bounds_depth_first_by_name() {
    let mut chart = sample_chart();
    rebuild_bounds(&mut chart).unwrap();

    // Roots by name: Assets, Equity, Expenses, Income, Liabilities.
    assert_eq!(bounds_of(&chart, "Assets - ACME"), TreeBounds::new(1, 6));
    assert_eq!(bounds_of(&chart, "Bank - ACME"), TreeBounds::new(2, 3));
    assert_eq!(bounds_of(&chart, "Cash - ACME"), TreeBounds::new(4, 5));
    assert_eq!(bounds_of(&chart, "Equity - ACME"), TreeBounds::new(7, 8));
    assert_eq!(bounds_of(&chart, "Income - ACME"), TreeBounds::new(11, 14));
    assert_eq!(bounds_of(&chart, "Tuition - ACME"), TreeBounds::new(12, 13));
}

#[test]
fn test_rebuild_bounds_unknown_parent() {
    let mut chart = vec![account("Cash - ACME", Some("Missing"), RootType::Asset, false)];
    let err = rebuild_bounds(&mut chart).unwrap_err();
    assert_eq!(
        err,
        AccountError::UnknownParent {
            name: "Cash - ACME".to_string(),
            parent: "Missing".to_string(),
        }
    );
}

#[test]
fn test_rebuild_bounds_cycle() {
    let mut chart = vec![
        account("A", Some("B"), RootType::Asset, true),
        account("B", Some("A"), RootType::Asset, true),
    ];
    assert!(matches!(rebuild_bounds(&mut chart), Err(AccountError::Cycle(_))));
    // Bounds are untouched on failure.
    assert!(chart.iter().all(|a| a.bounds == TreeBounds::default()));
}

#[test]
fn test_rebuild_bounds_cost_centers() {
    let mut centers = vec![
        cost_center("Main - ACME", None, true),
        cost_center("Primary - ACME", Some("Main - ACME"), false),
    ];
    rebuild_bounds(&mut centers).unwrap();
    assert_eq!(centers[0].bounds, TreeBounds::new(1, 4));
    assert_eq!(centers[1].bounds, TreeBounds::new(2, 3));
}

#[test]
fn test_root_listing_sorted_by_statement_and_root_type() {
    let chart = sample_chart();
    let nodes = account_children(&chart, None, &OrganizationName::from("ACME"), true);
    let values: Vec<&str> = nodes.iter().map(|n| n.value.as_str()).collect();
    assert_eq!(
        values,
        vec![
            "Assets - ACME",
            "Liabilities - ACME",
            "Equity - ACME",
            "Income - ACME",
            "Expenses - ACME",
        ]
    );
    assert_eq!(nodes[0].report_type, Some(ReportType::BalanceSheet));
    assert_eq!(nodes[0].parent, None);
    assert!(nodes.iter().all(|n| n.expandable));
}

#[test]
fn test_root_listing_filters_organization() {
    let chart = sample_chart();
    let nodes = account_children(&chart, None, &OrganizationName::from("Other"), true);
    assert!(nodes.is_empty());
}

#[test]
fn test_child_listing() {
    let chart = sample_chart();
    let nodes = account_children(
        &chart,
        Some("Assets - ACME"),
        &OrganizationName::from("ACME"),
        false,
    );
    let values: Vec<&str> = nodes.iter().map(|n| n.value.as_str()).collect();
    assert_eq!(values, vec!["Bank - ACME", "Cash - ACME"]);
    assert_eq!(nodes[0].parent.as_deref(), Some("Assets - ACME"));
    assert_eq!(nodes[0].report_type, None);
    assert!(!nodes[0].expandable);
}

#[test]
fn test_numbered_roots_sorted_by_value() {
    let chart = vec![
        account("4000 - Income - ACME", None, RootType::Income, true),
        account("1000 - Assets - ACME", None, RootType::Asset, true),
        account("2000 - Liabilities - ACME", None, RootType::Liability, true),
    ];
    let nodes = account_children(&chart, None, &OrganizationName::from("ACME"), true);
    let values: Vec<&str> = nodes.iter().map(|n| n.value.as_str()).collect();
    assert_eq!(
        values,
        vec!["1000 - Assets - ACME", "2000 - Liabilities - ACME", "4000 - Income - ACME"]
    );
}

#[test]
fn test_cost_center_listing() {
    let centers = vec![
        cost_center("Main - ACME", None, true),
        cost_center("Primary - ACME", Some("Main - ACME"), false),
    ];
    let org = OrganizationName::from("ACME");

    let roots = cost_center_children(&centers, None, &org, true);
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].root_type, None);

    let children = cost_center_children(&centers, Some("Main - ACME"), &org, false);
    assert_eq!(children[0].parent.as_deref(), Some("Main - ACME"));
}

#[test]
fn test_tree_node_serialization_skips_empty_fields() {
    let chart = sample_chart();
    let nodes = account_children(
        &chart,
        Some("Income - ACME"),
        &OrganizationName::from("ACME"),
        false,
    );
    let value = serde_json::to_value(&nodes[0]).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "value": "Tuition - ACME",
            "expandable": false,
            "root_type": "Income",
            "account_currency": "USD",
            "parent": "Income - ACME"
        })
    );
}

#[test]
fn test_doctype_parse() {
    assert_eq!("Cost Center".parse::<TreeDoctype>().unwrap(), TreeDoctype::CostCenter);
    assert!(matches!(
        "Budget".parse::<TreeDoctype>(),
        Err(AccountError::UnknownDoctype(_))
    ));
}

/// Random forests: node `i` has a parent among nodes `0..i` or none.
fn forest() -> impl Strategy<Value = Vec<Option<usize>>> {
    (1usize..40).prop_flat_map(|n| {
        (0..n)
            .map(|i| {
                if i == 0 {
                    Just(None).boxed()
                } else {
                    prop::option::of(0..i).boxed()
                }
            })
            .collect::<Vec<_>>()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every child lies strictly within its parent and ordinals are unique.
    #[test]
    fn prop_rebuilt_bounds_nest(parents in forest()) {
        let names: Vec<String> = (0..parents.len()).map(|i| format!("N{i:03}")).collect();
        let mut nodes: Vec<CostCenter> = parents
            .iter()
            .enumerate()
            .map(|(i, p)| cost_center(&names[i], p.map(|p| names[p].as_str()), true))
            .collect();

        rebuild_bounds(&mut nodes).unwrap();

        let mut ordinals = HashSet::new();
        for (i, node) in nodes.iter().enumerate() {
            prop_assert!(node.bounds.lft < node.bounds.rgt);
            prop_assert!(ordinals.insert(node.bounds.lft));
            prop_assert!(ordinals.insert(node.bounds.rgt));
            if let Some(p) = parents[i] {
                let parent = nodes[p].bounds;
                prop_assert!(parent.contains(node.bounds));
                prop_assert!(parent.lft < node.bounds.lft && node.bounds.rgt < parent.rgt);
            }
        }
        let n = i32::try_from(nodes.len()).unwrap();
        prop_assert_eq!(ordinals.len(), nodes.len() * 2);
        prop_assert!(ordinals.iter().all(|o| (1..=2 * n).contains(o)));
    }
}
