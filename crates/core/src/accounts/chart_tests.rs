use super::*;
use crate::accounts::{Account, RootType, TreeBounds, prepare_account, rebuild_bounds};
use bursar_shared::types::OrganizationName;

const SCHOOL_CHART: &str = r#"{
    "name": "School Standard",
    "country_code": "us",
    "tree": {
        "Assets": {
            "root_type": "Asset",
            "account_number": "1000",
            "Current Assets": {
                "account_number": "1100",
                "Cash": {"account_number": "1110", "account_type": "Cash"},
                "Receivables": {"account_number": "1120", "is_group": 1}
            }
        },
        "Income": {
            "root_type": "Income",
            "Tuition Fees": {"account_type": "Income Account"}
        }
    }
}"#;

fn chart() -> ChartTemplate {
    ChartTemplate::from_json(SCHOOL_CHART).unwrap()
}

fn acme() -> Organization {
    Organization {
        name: OrganizationName::from("ACME"),
        abbr: "AC".to_string(),
        default_currency: "USD".parse().unwrap(),
    }
}

#[test]
fn test_build_tree_preserves_order_and_numbering() {
    let nodes = chart().build_tree();
    let values: Vec<&str> = nodes.iter().map(|n| n.value.as_str()).collect();
    assert_eq!(
        values,
        vec![
            "1000 - Assets",
            "1100 - Current Assets",
            "1110 - Cash",
            "1120 - Receivables",
            "Income",
            "Tuition Fees",
        ]
    );
    assert_eq!(nodes[1].parent_account.as_deref(), Some("1000 - Assets"));
    assert_eq!(nodes[2].account_number.as_deref(), Some("1110"));
    assert_eq!(nodes[4].account_number, None);
}

#[test]
fn test_group_detection() {
    let nodes = chart().build_tree();
    let expandable = |value: &str| nodes.iter().find(|n| n.value == value).unwrap().expandable;

    assert!(expandable("1000 - Assets"));
    assert!(expandable("1100 - Current Assets"));
    assert!(!expandable("1110 - Cash"));
    // Explicit flag without children.
    assert!(expandable("1120 - Receivables"));
    assert!(!expandable("Tuition Fees"));
}

#[test]
fn test_identify_is_group_ignores_reserved_keys() {
    let leaf = serde_json::json!({"account_type": "Cash", "tax_rate": 5, "account_name": "X"});
    assert!(!identify_is_group(&leaf));
    assert!(identify_is_group(&serde_json::json!({"is_group": true})));
    assert!(!identify_is_group(&serde_json::json!({"is_group": 0})));
    assert!(identify_is_group(&serde_json::json!({"Child": {}})));
}

#[test]
fn test_coa_children() {
    let chart = chart();

    let top: Vec<String> = chart
        .coa_children(Some(ALL_ACCOUNTS))
        .into_iter()
        .map(|n| n.value)
        .collect();
    assert_eq!(top, vec!["1000 - Assets", "Income"]);
    assert_eq!(chart.coa_children(None).len(), 2);

    let under_current = chart.coa_children(Some("1100 - Current Assets"));
    assert_eq!(under_current.len(), 2);
    assert!(chart.coa_children(Some("Nope")).is_empty());
}

#[test]
fn test_chart_node_serialization() {
    let nodes = chart().coa_children(Some("Income"));
    let value = serde_json::to_value(&nodes).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{
            "value": "Tuition Fees",
            "parent_account": "Income",
            "expandable": false
        }])
    );
}

#[test]
fn test_invalid_chart_json() {
    assert!(matches!(
        ChartTemplate::from_json("{\"name\": 1}"),
        Err(AccountError::InvalidChart(_))
    ));
}

#[test]
fn test_to_new_accounts_creation_order() {
    let requests = chart().to_new_accounts(&acme()).unwrap();
    let names: Vec<&str> = requests.iter().map(|r| r.account_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Assets", "Current Assets", "Cash", "Receivables", "Income", "Tuition Fees"]
    );

    assert!(requests[0].is_root);
    assert_eq!(requests[0].root_type, Some(RootType::Asset));
    assert_eq!(
        requests[1].parent_account.as_ref().map(AccountName::as_str),
        Some("1000 - Assets - AC")
    );
    assert_eq!(
        requests[5].parent_account.as_ref().map(AccountName::as_str),
        Some("Income - AC")
    );
    assert!(requests.iter().all(|r| r.ignore_permissions));
}

#[test]
fn test_imported_chart_builds_a_valid_tree() {
    let org = acme();
    let mut accounts: Vec<Account> = Vec::new();
    for request in chart().to_new_accounts(&org).unwrap() {
        let account = prepare_account(request, &accounts, &org, || false).unwrap();
        accounts.push(account);
    }
    rebuild_bounds(&mut accounts).unwrap();

    let find = |name: &str| accounts.iter().find(|a| a.name.as_str() == name).unwrap();
    let assets = find("1000 - Assets - AC");
    let cash = find("1110 - Cash - AC");
    let tuition = find("Tuition Fees - AC");

    assert!(assets.bounds.contains(cash.bounds));
    assert_eq!(cash.root_type, Some(RootType::Asset));
    assert_eq!(tuition.root_type, Some(RootType::Income));
    assert!(tuition.is_profit_and_loss());
    assert_ne!(cash.bounds, TreeBounds::default());
}

#[test]
fn test_unknown_root_type_rejected() {
    let chart = ChartTemplate::from_json(
        r#"{"name": "Bad", "tree": {"Things": {"root_type": "Stuff"}}}"#,
    )
    .unwrap();
    assert!(matches!(
        chart.to_new_accounts(&acme()),
        Err(AccountError::InvalidChart(_))
    ));
}
