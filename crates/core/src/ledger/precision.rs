//! Currency precision derived from configuration.

/// Separators and decimal places of a display number format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    /// Decimal separator; empty for integer formats.
    pub decimal_separator: &'static str,
    /// Thousands separator.
    pub group_separator: &'static str,
    /// Decimal places.
    pub precision: u32,
}

const fn format(
    decimal_separator: &'static str,
    group_separator: &'static str,
    precision: u32,
) -> NumberFormat {
    NumberFormat {
        decimal_separator,
        group_separator,
        precision,
    }
}

/// Precision used when nothing else is known.
pub const DEFAULT_PRECISION: u32 = 2;

/// Looks up a display number format. Unknown formats behave like `#,###.##`.
#[must_use]
pub fn number_format_info(number_format: &str) -> NumberFormat {
    match number_format {
        "#.###,##" => format(",", ".", 2),
        "# ###.##" => format(".", " ", 2),
        "# ###,##" => format(",", " ", 2),
        "#'###.##" => format(".", "'", 2),
        "#, ###.##" => format(".", ", ", 2),
        "#,###.###" => format(".", ",", 3),
        "#.###" => format("", ".", 0),
        "#,###" => format("", ",", 0),
        "#.########" => format(".", "", 8),
        // "#,###.##", "#,##,###.##" and anything unrecognised
        _ => format(".", ",", 2),
    }
}

/// Configured precision, else the number format's, with zero falling back to 2.
#[must_use]
pub fn currency_precision(configured: u32, number_format: &str) -> u32 {
    let precision = if configured == 0 {
        number_format_info(number_format).precision
    } else {
        configured
    };
    if precision == 0 { DEFAULT_PRECISION } else { precision }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("#,###.##", 2)]
    #[case("#.###,##", 2)]
    #[case("# ###.##", 2)]
    #[case("# ###,##", 2)]
    #[case("#'###.##", 2)]
    #[case("#, ###.##", 2)]
    #[case("#,##,###.##", 2)]
    #[case("#,###.###", 3)]
    #[case("#.###", 0)]
    #[case("#,###", 0)]
    #[case("#.########", 8)]
    #[case("bogus", 2)]
    fn test_number_format_precision(#[case] fmt: &str, #[case] expected: u32) {
        assert_eq!(number_format_info(fmt).precision, expected);
    }

    #[rstest]
    #[case(4, "#,###.##", 4)]
    #[case(0, "#,###.###", 3)]
    #[case(0, "#.########", 8)]
    #[case(0, "#,###", 2)]
    #[case(0, "unknown", 2)]
    fn test_currency_precision(#[case] configured: u32, #[case] fmt: &str, #[case] expected: u32) {
        assert_eq!(currency_precision(configured, fmt), expected);
    }
}
