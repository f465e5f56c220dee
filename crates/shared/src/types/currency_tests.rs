use super::*;
use std::str::FromStr;

#[test]
fn test_currency_from_str_normalizes_case() {
    assert_eq!(CurrencyCode::from_str("mad").unwrap().as_str(), "MAD");
    assert_eq!(CurrencyCode::from_str(" eur ").unwrap().to_string(), "EUR");
}

#[test]
fn test_currency_from_str_rejects_garbage() {
    assert!(CurrencyCode::from_str("").is_err());
    assert!(CurrencyCode::from_str("US").is_err());
    assert!(CurrencyCode::from_str("US1").is_err());
    assert!(CurrencyCode::from_str("DOLLAR").is_err());
}

#[test]
fn test_currency_serde() {
    let code: CurrencyCode = serde_json::from_str("\"inr\"").unwrap();
    assert_eq!(code.as_str(), "INR");
    assert_eq!(serde_json::to_string(&code).unwrap(), "\"INR\"");
    assert!(serde_json::from_str::<CurrencyCode>("\"rupees\"").is_err());
}
