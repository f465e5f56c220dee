//! Fiscal year resolution.
//!
//! Given a date and/or an explicit fiscal year name, pick the applicable
//! year from an organization's active years (latest start first).

use bursar_shared::AppError;
use bursar_shared::types::{FiscalYearName, OrganizationName};
use chrono::NaiveDate;
use thiserror::Error;
use tracing::warn;

use super::year::FiscalYear;

/// Display format for dates inside user-facing messages.
const NOTICE_DATE_FORMAT: &str = "%d-%m-%Y";

/// How a resolution failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Emit a user-facing notice and return the error.
    #[default]
    Notify,
    /// Only return the error.
    Silent,
}

/// Errors raised while resolving or validating fiscal years.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FiscalYearError {
    /// No active fiscal year matched the date or name.
    #[error("{message}")]
    NotInAnyYear {
        /// User-facing message.
        message: String,
        /// Whether the caller asked for the message to be surfaced.
        notify: bool,
    },

    /// A document claims a fiscal year that does not contain its date.
    #[error("{label} '{date}' not in Fiscal Year {fiscal_year}")]
    Mismatch {
        /// Field label, e.g. "Posting Date".
        label: String,
        /// Formatted date.
        date: String,
        /// The claimed fiscal year.
        fiscal_year: FiscalYearName,
    },

    /// Neither a date nor a fiscal year name was supplied.
    #[error("A date or a fiscal year is required")]
    MissingCriteria,

    /// Start date is not before end date.
    #[error("Fiscal year start date {start} must be before end date {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },
}

impl FiscalYearError {
    /// Returns true if the message should reach the user.
    #[must_use]
    pub const fn is_notice(&self) -> bool {
        matches!(self, Self::NotInAnyYear { notify: true, .. } | Self::Mismatch { .. })
    }
}

impl From<FiscalYearError> for AppError {
    fn from(err: FiscalYearError) -> Self {
        if err.is_notice() {
            return Self::Notice(err.to_string());
        }
        match err {
            FiscalYearError::MissingCriteria | FiscalYearError::InvalidDateRange { .. } => {
                Self::Validation(err.to_string())
            }
            other => Self::BusinessRule(other.to_string()),
        }
    }
}

/// Resolution criteria.
#[derive(Debug, Clone, Copy)]
pub struct FiscalYearLookup<'a> {
    /// Date that must fall within the year.
    pub date: Option<NaiveDate>,
    /// Explicit fiscal year name.
    pub fiscal_year: Option<&'a FiscalYearName>,
    /// Label used in the failure message.
    pub label: &'a str,
    /// Organization named in the failure message.
    pub organization: Option<&'a OrganizationName>,
    /// Failure reporting mode.
    pub verbosity: Verbosity,
}

impl<'a> FiscalYearLookup<'a> {
    /// Looks up the year containing `date`.
    #[must_use]
    pub const fn for_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            fiscal_year: None,
            label: "Date",
            organization: None,
            verbosity: Verbosity::Notify,
        }
    }

    /// Looks up a year by name.
    #[must_use]
    pub const fn for_name(name: &'a FiscalYearName) -> Self {
        Self {
            date: None,
            fiscal_year: Some(name),
            label: "Date",
            organization: None,
            verbosity: Verbosity::Notify,
        }
    }

    /// Also accept a year matching this name.
    #[must_use]
    pub const fn name(mut self, name: Option<&'a FiscalYearName>) -> Self {
        self.fiscal_year = name;
        self
    }

    /// Sets the organization used in the failure message.
    #[must_use]
    pub const fn organization(mut self, organization: Option<&'a OrganizationName>) -> Self {
        self.organization = organization;
        self
    }

    /// Sets the label used in the failure message.
    #[must_use]
    pub const fn label(mut self, label: &'a str) -> Self {
        self.label = label;
        self
    }

    /// Sets the failure reporting mode.
    #[must_use]
    pub const fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Fails without a user-facing notice.
    #[must_use]
    pub const fn silent(self) -> Self {
        self.verbosity(Verbosity::Silent)
    }

    fn matches(&self, fy: &FiscalYear) -> bool {
        self.fiscal_year.is_some_and(|name| &fy.name == name)
            || self.date.is_some_and(|date| fy.contains(date))
    }

    fn failure(&self) -> FiscalYearError {
        let shown = match (self.date, self.fiscal_year) {
            (Some(date), _) => date.format(NOTICE_DATE_FORMAT).to_string(),
            (None, Some(name)) => name.to_string(),
            (None, None) => String::new(),
        };
        let mut message = format!("{} {shown} is not in any active Fiscal Year", self.label);
        if let Some(org) = self.organization {
            message = format!("{message} for {org}");
        }

        let notify = self.verbosity == Verbosity::Notify;
        if notify {
            warn!(target: "bursar::notice", organization = ?self.organization, "{message}");
        }
        FiscalYearError::NotInAnyYear { message, notify }
    }
}

/// Returns the first year (in the given order) matching the lookup.
///
/// `years` is expected to be the organization's active years, latest start first.
pub fn find_fiscal_year<'y>(
    years: &'y [FiscalYear],
    lookup: &FiscalYearLookup<'_>,
) -> Result<&'y FiscalYear, FiscalYearError> {
    if lookup.date.is_none() && lookup.fiscal_year.is_none() {
        return Err(FiscalYearError::MissingCriteria);
    }

    years
        .iter()
        .find(|fy| lookup.matches(fy))
        .ok_or_else(|| lookup.failure())
}

/// Start of the fiscal year used to scope Profit-and-Loss balances.
///
/// - date inside a year: that year's start
/// - no year, date after `today`: the start of today's year, looked up in
///   `all_years` without an organization (failures propagate with a notice)
/// - no year, date not after `today`: `None`, the date predates every fiscal year
///
/// `years` is the organization's active years; `all_years` every active year.
pub fn fiscal_year_start(
    years: &[FiscalYear],
    all_years: &[FiscalYear],
    date: NaiveDate,
    today: NaiveDate,
    organization: Option<&OrganizationName>,
) -> Result<Option<NaiveDate>, FiscalYearError> {
    let lookup = FiscalYearLookup::for_date(date).organization(organization).silent();
    match find_fiscal_year(years, &lookup) {
        Ok(fy) => Ok(Some(fy.start_date)),
        Err(_) if date > today => {
            find_fiscal_year(all_years, &FiscalYearLookup::for_date(today))
                .map(|fy| Some(fy.start_date))
        }
        Err(_) => Ok(None),
    }
}

/// Checks that `fiscal_year` is the year `date` resolves to.
///
/// With overlapping years only the first in `years` order is accepted.
pub fn validate_fiscal_year(
    years: &[FiscalYear],
    date: NaiveDate,
    fiscal_year: &FiscalYearName,
    label: &str,
    organization: Option<&OrganizationName>,
) -> Result<(), FiscalYearError> {
    if correct_fiscal_year(years, date, label, organization)? == *fiscal_year {
        Ok(())
    } else {
        Err(FiscalYearError::Mismatch {
            label: label.to_string(),
            date: date.format(NOTICE_DATE_FORMAT).to_string(),
            fiscal_year: fiscal_year.clone(),
        })
    }
}

/// Returns the name of the year containing `date`, for documents whose
/// claimed year should be overwritten rather than rejected.
pub fn correct_fiscal_year(
    years: &[FiscalYear],
    date: NaiveDate,
    label: &str,
    organization: Option<&OrganizationName>,
) -> Result<FiscalYearName, FiscalYearError> {
    let lookup = FiscalYearLookup::for_date(date)
        .label(label)
        .organization(organization);
    find_fiscal_year(years, &lookup).map(|fy| fy.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiscal::year::active_years_for;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Academic years running August to July.
    fn academic_years() -> Vec<FiscalYear> {
        let years = (2022..=2025).map(|y| FiscalYear {
            name: FiscalYearName::new(format!("{y}-{}", y + 1)),
            start_date: date(y, 8, 1),
            end_date: date(y + 1, 7, 31),
            disabled: false,
            organizations: vec![],
        });
        active_years_for(years, None)
    }

    #[test]
    fn test_resolves_by_date() {
        let years = academic_years();
        let fy = find_fiscal_year(&years, &FiscalYearLookup::for_date(date(2024, 3, 10))).unwrap();
        assert_eq!(fy.name.as_str(), "2023-2024");
    }

    #[test]
    fn test_resolves_by_name() {
        let years = academic_years();
        let name = FiscalYearName::from("2022-2023");
        let fy = find_fiscal_year(&years, &FiscalYearLookup::for_name(&name)).unwrap();
        assert_eq!(fy.start_date, date(2022, 8, 1));
    }

    #[test]
    fn test_name_or_date_matches_first_in_order() {
        let years = academic_years();
        let name = FiscalYearName::from("2022-2023");
        // The date matches a later year, which comes first in descending order.
        let lookup = FiscalYearLookup::for_date(date(2025, 9, 1)).name(Some(&name));
        let fy = find_fiscal_year(&years, &lookup).unwrap();
        assert_eq!(fy.name.as_str(), "2025-2026");
    }

    #[test]
    fn test_failure_message_with_organization() {
        let years = academic_years();
        let org = OrganizationName::from("ACME School");
        let lookup = FiscalYearLookup::for_date(date(2019, 1, 1))
            .label("Posting Date")
            .organization(Some(&org));

        let err = find_fiscal_year(&years, &lookup).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Posting Date 01-01-2019 is not in any active Fiscal Year for ACME School"
        );
        assert!(err.is_notice());
    }

    #[test]
    fn test_silent_failure_is_not_a_notice() {
        let years = academic_years();
        let err = find_fiscal_year(&years, &FiscalYearLookup::for_date(date(2019, 1, 1)).silent())
            .unwrap_err();
        assert!(!err.is_notice());
        assert!(matches!(AppError::from(err), AppError::BusinessRule(_)));
    }

    #[test]
    fn test_missing_criteria() {
        let years = academic_years();
        let lookup = FiscalYearLookup {
            date: None,
            fiscal_year: None,
            label: "Date",
            organization: None,
            verbosity: Verbosity::Silent,
        };
        assert_eq!(
            find_fiscal_year(&years, &lookup).unwrap_err(),
            FiscalYearError::MissingCriteria
        );
    }

    #[test]
    fn test_year_start_in_range() {
        let years = academic_years();
        let start = fiscal_year_start(&years, &years, date(2024, 1, 5), date(2024, 2, 1), None).unwrap();
        assert_eq!(start, Some(date(2023, 8, 1)));
    }

    #[test]
    fn test_year_start_before_all_years() {
        let years = academic_years();
        let start = fiscal_year_start(&years, &years, date(2010, 1, 5), date(2024, 2, 1), None).unwrap();
        assert_eq!(start, None);
    }

    #[test]
    fn test_year_start_future_date_falls_back_to_today() {
        let years = academic_years();
        let start = fiscal_year_start(&years, &years, date(2040, 1, 5), date(2024, 2, 1), None).unwrap();
        assert_eq!(start, Some(date(2023, 8, 1)));
    }

    #[test]
    fn test_year_start_future_date_without_current_year_fails() {
        let years = academic_years();
        let err = fiscal_year_start(&years, &years, date(2040, 1, 5), date(2035, 2, 1), None).unwrap_err();
        assert!(err.is_notice());
    }

    #[test]
    fn test_year_start_future_date_ignores_organization_scope() {
        let other = OrganizationName::from("Other School");
        let acme = OrganizationName::from("ACME School");
        let restricted = FiscalYear {
            organizations: vec![other],
            ..academic_years().remove(0)
        };
        let all_years = vec![restricted];
        let acme_years = active_years_for(all_years.clone(), Some(&acme));
        assert!(acme_years.is_empty());

        let start = fiscal_year_start(
            &acme_years,
            &all_years,
            date(2040, 1, 1),
            date(2026, 1, 1),
            Some(&acme),
        )
        .unwrap();
        assert_eq!(start, Some(date(2025, 8, 1)));
    }

    #[test]
    fn test_validate_accepts_only_first_overlapping_year() {
        let mut years = academic_years();
        // A short year overlapping 2023-2024, starting later so it sorts first.
        years.insert(
            0,
            FiscalYear {
                name: FiscalYearName::from("Spring 2024"),
                start_date: date(2024, 1, 1),
                end_date: date(2024, 6, 30),
                disabled: false,
                organizations: vec![],
            },
        );
        let posting = date(2024, 3, 1);

        let spring = FiscalYearName::from("Spring 2024");
        assert!(validate_fiscal_year(&years, posting, &spring, "Posting Date", None).is_ok());

        let academic = FiscalYearName::from("2023-2024");
        let err = validate_fiscal_year(&years, posting, &academic, "Posting Date", None).unwrap_err();
        assert!(matches!(err, FiscalYearError::Mismatch { .. }));
    }

    #[test]
    fn test_validate_fiscal_year() {
        let years = academic_years();
        let good = FiscalYearName::from("2023-2024");
        let bad = FiscalYearName::from("2024-2025");
        let posting = date(2024, 2, 29);

        assert!(validate_fiscal_year(&years, posting, &good, "Posting Date", None).is_ok());

        let err = validate_fiscal_year(&years, posting, &bad, "Posting Date", None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Posting Date '29-02-2024' not in Fiscal Year 2024-2025"
        );
        assert!(matches!(AppError::from(err), AppError::Notice(_)));

        assert_eq!(
            correct_fiscal_year(&years, posting, "Posting Date", None).unwrap(),
            good
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Any date inside a year's bounds resolves to that year.
        #[test]
        fn prop_date_within_year_resolves_to_it(year in 2022i32..=2025, offset in 0i64..365) {
            let years = academic_years();
            let start = date(year, 8, 1);
            let day = start + chrono::Duration::days(offset);
            let expected = years.iter().find(|fy| fy.start_date == start).unwrap();
            prop_assume!(expected.contains(day));

            let fy = find_fiscal_year(&years, &FiscalYearLookup::for_date(day)).unwrap();
            prop_assert_eq!(&fy.name, &expected.name);
        }

        /// Dates before the earliest year never resolve.
        #[test]
        fn prop_date_before_all_years_fails(days_before in 1i64..5000) {
            let years = academic_years();
            let day = date(2022, 8, 1) - chrono::Duration::days(days_before);
            let lookup = FiscalYearLookup::for_date(day).silent();
            prop_assert!(find_fiscal_year(&years, &lookup).is_err());
        }
    }
}
