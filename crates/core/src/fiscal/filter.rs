//! Fiscal year filter description for report UIs.

use chrono::NaiveDate;
use serde::Serialize;

use super::year::FiscalYear;

/// One selectable fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    /// Shown to the user.
    pub label: String,
    /// Submitted value.
    pub value: String,
    /// `[start, end]` the filter expands to.
    pub query_value: [NaiveDate; 2],
}

/// A Select filter whose options expand to a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterField {
    /// Always "Select".
    pub fieldtype: &'static str,
    /// One option per fiscal year.
    pub options: Vec<FilterOption>,
    /// Always "Between".
    pub operator: &'static str,
    /// Always true: options carry their own query values.
    pub query_value: bool,
}

/// Builds the filter field from the given years, keeping their order.
#[must_use]
pub fn fiscal_year_filter_field(years: &[FiscalYear]) -> FilterField {
    let options = years
        .iter()
        .map(|fy| FilterOption {
            label: fy.name.to_string(),
            value: fy.name.to_string(),
            query_value: [fy.start_date, fy.end_date],
        })
        .collect();

    FilterField {
        fieldtype: "Select",
        options,
        operator: "Between",
        query_value: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bursar_shared::types::FiscalYearName;
    use serde_json::json;

    #[test]
    fn test_filter_field_shape() {
        let years = vec![FiscalYear {
            name: FiscalYearName::from("2025-2026"),
            start_date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 7, 31).unwrap(),
            disabled: false,
            organizations: vec![],
        }];

        let field = fiscal_year_filter_field(&years);
        let value = serde_json::to_value(&field).unwrap();

        assert_eq!(
            value,
            json!({
                "fieldtype": "Select",
                "options": [{
                    "label": "2025-2026",
                    "value": "2025-2026",
                    "query_value": ["2025-08-01", "2026-07-31"]
                }],
                "operator": "Between",
                "query_value": true
            })
        );
    }

    #[test]
    fn test_filter_field_empty() {
        let field = fiscal_year_filter_field(&[]);
        assert!(field.options.is_empty());
        assert_eq!(field.fieldtype, "Select");
    }
}
