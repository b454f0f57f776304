//! Currency codes and rate arithmetic

use crate::error::{FxError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ISO 4217 style currency code, normalized to upper case
///
/// Any three-letter alphabetic code is accepted (ARS, CLP, COP, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse and normalize a code (`" eur "` -> `EUR`)
    pub fn parse(code: &str) -> Result<Self> {
        let normalized = normalize(code);
        if normalized.len() == 3 && normalized.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(normalized))
        } else {
            Err(FxError::InvalidCurrency(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a comma separated list, ignoring blank entries
    pub fn parse_list(list: &str) -> Result<Vec<Self>> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::parse)
            .collect()
    }
}

/// Trim and upper-case a currency string without validating it
pub fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

impl FromStr for CurrencyCode {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = FxError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rate of the inverse pair (`quote/base` from `base/quote`)
///
/// `None` for a non-positive or non-finite rate.
pub fn invert_rate(rate: f64) -> Option<f64> {
    (rate.is_finite() && rate > 0.0).then(|| 1.0 / rate)
}

/// Cross rate through a shared base
///
/// With `base_to_quote = base/quote` and `base_to_new = base/new`,
/// returns `new/quote = base_to_quote / base_to_new`.
pub fn cross_rate(base_to_quote: f64, base_to_new: f64) -> Option<f64> {
    (base_to_new.is_finite() && base_to_new > 0.0).then(|| base_to_quote / base_to_new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_parse() {
        assert_eq!(CurrencyCode::parse("USD").unwrap().as_str(), "USD");
        assert_eq!(CurrencyCode::parse(" eur ").unwrap().as_str(), "EUR");
        assert!(CurrencyCode::parse("EURO").is_err());
        assert!(CurrencyCode::parse("U$D").is_err());
        assert!(CurrencyCode::parse("").is_err());
    }

    #[test]
    fn test_parse_list() {
        let codes = CurrencyCode::parse_list("eur, GBP,,jpy ").unwrap();
        let codes: Vec<_> = codes.iter().map(|c| c.as_str()).collect();
        assert_eq!(codes, vec!["EUR", "GBP", "JPY"]);
        assert!(CurrencyCode::parse_list("EUR,12").is_err());
    }

    #[test]
    fn test_invert_rate() {
        let inverse = invert_rate(1.2).unwrap();
        assert!((inverse - 0.8333).abs() < 0.001);
        assert_eq!(invert_rate(0.0), None);
        assert_eq!(invert_rate(-1.0), None);
    }

    #[test]
    fn test_cross_rate() {
        // USD/GBP = 0.80, USD/EUR = 0.90 -> EUR/GBP = 0.8889
        let rate = cross_rate(0.80, 0.90).unwrap();
        assert!((rate - 0.8889).abs() < 0.001);
        assert_eq!(cross_rate(0.80, 0.0), None);
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let code: CurrencyCode = serde_json::from_str("\"gbp\"").unwrap();
        assert_eq!(code.as_str(), "GBP");
        assert!(serde_json::from_str::<CurrencyCode>("\"pounds\"").is_err());
    }
}
