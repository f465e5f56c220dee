//! Account naming and number uniqueness.

use super::error::AccountError;

/// Builds "[number - ]title - suffix".
///
/// The suffix is the last `-` separated segment of `existing_name` when the
/// document is being renamed, otherwise the organization abbreviation.
#[must_use]
pub fn autoname_with_number(
    number: Option<&str>,
    title: &str,
    existing_name: Option<&str>,
    org_abbr: &str,
) -> String {
    let suffix = existing_name
        .filter(|name| !name.is_empty())
        .and_then(|name| name.rsplit('-').next())
        .map_or(org_abbr, str::trim);

    let mut parts = Vec::with_capacity(3);
    if let Some(number) = number.map(str::trim).filter(|n| !n.is_empty()) {
        parts.push(number);
    }
    parts.push(title.trim());
    parts.push(suffix);
    parts.join(" - ")
}

/// Rejects `number` if another document already holds it.
///
/// `candidates` are `(name, number)` pairs of the same doctype, already
/// restricted to the organization when one applies.
pub fn validate_field_number<'a>(
    doctype: &str,
    docname: &str,
    number: Option<&str>,
    candidates: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
) -> Result<(), AccountError> {
    let Some(number) = number.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(());
    };

    let taken = candidates
        .into_iter()
        .find(|(name, other)| *name != docname && other.map(str::trim) == Some(number));

    match taken {
        Some((other, _)) => Err(AccountError::NumberInUse {
            doctype: doctype.to_string(),
            number: number.to_string(),
            other: other.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("1110"), "Cash", None, "ACME", "1110 - Cash - ACME")]
    #[case(None, "Cash", None, "ACME", "Cash - ACME")]
    #[case(Some("  "), " Cash ", None, "ACME", "Cash - ACME")]
    #[case(Some("1120"), "Petty Cash", Some("Cash - ACME"), "XYZ", "1120 - Petty Cash - ACME")]
    #[case(None, "Bank", Some(""), "ACME", "Bank - ACME")]
    fn test_autoname_with_number(
        #[case] number: Option<&str>,
        #[case] title: &str,
        #[case] existing: Option<&str>,
        #[case] abbr: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(autoname_with_number(number, title, existing, abbr), expected);
    }

    #[test]
    fn test_number_free() {
        let candidates = vec![("1110 - Cash - ACME", Some("1110")), ("Bank - ACME", None)];
        assert!(validate_field_number("Account", "New", Some("1120"), candidates).is_ok());
    }

    #[test]
    fn test_number_taken_by_other_document() {
        let candidates = vec![("1110 - Cash - ACME", Some("1110"))];
        let err = validate_field_number("Account", "New", Some("1110"), candidates).unwrap_err();
        assert!(matches!(err, AccountError::NumberInUse { ref other, .. } if other == "1110 - Cash - ACME"));
    }

    #[test]
    fn test_own_number_is_allowed() {
        let candidates = vec![("1110 - Cash - ACME", Some("1110"))];
        assert!(
            validate_field_number("Account", "1110 - Cash - ACME", Some("1110"), candidates)
                .is_ok()
        );
    }

    #[test]
    fn test_blank_number_skips_check() {
        let candidates = vec![("X", Some(""))];
        assert!(validate_field_number("Account", "Y", Some(""), candidates).is_ok());
        assert!(validate_field_number("Account", "Y", None, Vec::new()).is_ok());
    }
}
