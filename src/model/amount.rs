//! Amount type for handling monetary values exactly.
//!
//! Teller sends amounts as JSON strings such as `"-12.50"`. This module provides the `Amount` type
//! which keeps that text exactly as it was received, so it is served back unchanged, and which
//! parses it into a `Decimal` on demand so that values are never routed through a binary float.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents a signed dollar amount.
///
/// # Examples
///
/// ```
/// # use peppermint::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-12.50").unwrap();
/// assert_eq!(amount.to_string(), "-12.50");
/// assert!(amount.is_negative());
/// ```
///
/// The text is kept, so these compare equal by value but print differently:
/// ```
/// # use peppermint::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("5").unwrap();
/// let b = Amount::from_str("+5.00").unwrap();
/// assert_eq!(a.value().unwrap(), b.value().unwrap());
/// assert_eq!(b.to_string(), "+5.00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Amount(String);

impl Amount {
    /// The amount exactly as it was received.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the amount into a `Decimal`.
    ///
    /// # Errors
    /// `AmountError::OutOfRange` if the amount does not fit in a `Decimal` (more than 28
    /// significant digits).
    pub fn value(&self) -> Result<Decimal, AmountError> {
        let s = self.0.trim();
        let parsed = if s.contains(['e', 'E']) {
            Decimal::from_scientific(s)
        } else {
            Decimal::from_str(s)
        };
        parsed.map_err(AmountError::OutOfRange)
    }

    pub fn is_zero(&self) -> bool {
        !self.mantissa().any(|c| matches!(c, '1'..='9'))
    }

    /// Returns true if the amount is negative. `-0.00` is not.
    pub fn is_negative(&self) -> bool {
        self.0.trim_start().starts_with('-') && !self.is_zero()
    }

    /// The digits before any exponent.
    fn mantissa(&self) -> impl Iterator<Item = char> + '_ {
        self.0.chars().take_while(|c| !matches!(c, 'e' | 'E'))
    }
}

/// Checks `s` against `[+-]digits[.digits][(e|E)[+-]digits]`, ignoring surrounding whitespace.
/// At least one digit is required before the exponent.
fn is_decimal(s: &str) -> bool {
    let s = s.trim();
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };

    let unsigned = mantissa.strip_prefix(['+', '-']).unwrap_or(mantissa);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if whole.len() + fraction.len() == 0 || !digits(whole) || !digits(fraction) {
        return false;
    }

    match exponent {
        None => true,
        Some(exponent) => {
            let exponent = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
            !exponent.is_empty() && digits(exponent)
        }
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub enum AmountError {
    /// The text is not a decimal number.
    Invalid(String),
    /// The text is a decimal number but does not fit in a `Decimal`.
    OutOfRange(rust_decimal::Error),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Invalid(s) => write!(f, "'{s}' is not a decimal amount"),
            AmountError::OutOfRange(e) => write!(f, "Amount is out of range: {e}"),
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AmountError::Invalid(_) => None,
            AmountError::OutOfRange(e) => Some(e),
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_decimal(s) {
            Ok(Amount(s.to_string()))
        } else {
            Err(AmountError::Invalid(s.to_string()))
        }
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_negative() {
        let amount = Amount::from_str("-12.50").unwrap();
        assert_eq!(amount.value().unwrap(), Decimal::new(-1250, 2));
        assert!(amount.is_negative());
        assert!(!amount.is_zero());
    }

    #[test]
    fn test_text_is_served_unchanged() {
        for s in [
            "-12.50",
            "5.00",
            "0.10",
            "1234567.891",
            "-0.01",
            "+5.00",
            "-0.00",
            "1e3",
            " 5.00",
            "123456789012345678901234567890.5",
        ] {
            let amount: Amount = serde_json::from_value(serde_json::json!(s)).unwrap();
            assert_eq!(amount.as_str(), s);
            assert_eq!(serde_json::to_value(&amount).unwrap(), serde_json::json!(s));
        }
    }

    #[test]
    fn test_value() {
        assert_eq!(
            Amount::from_str("1e3").unwrap().value().unwrap(),
            Decimal::new(1000, 0)
        );
        assert_eq!(
            Amount::from_str("+5.00").unwrap().value().unwrap(),
            Decimal::new(500, 2)
        );
        assert!(matches!(
            Amount::from_str("123456789012345678901234567890.5")
                .unwrap()
                .value(),
            Err(AmountError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_no_float_drift() {
        let a = Amount::from_str("0.10").unwrap().value().unwrap();
        let b = Amount::from_str("0.20").unwrap().value().unwrap();
        assert_eq!((a + b).to_string(), "0.30");
    }

    #[test]
    fn test_zero_is_not_negative() {
        for s in ["0.00", "-0.00", "+0", "0e5"] {
            let zero = Amount::from_str(s).unwrap();
            assert!(zero.is_zero(), "{s}");
            assert!(!zero.is_negative(), "{s}");
        }
    }

    #[test]
    fn test_parse_garbage() {
        for s in ["twelve", "$12.50", "", "-", ".", "1.2.3", "1e", "--1", "1,000.00", "0x10"] {
            assert!(
                matches!(Amount::from_str(s), Err(AmountError::Invalid(_))),
                "{s}"
            );
        }
    }

    #[test]
    fn test_json_is_a_string() {
        let amount: Amount = serde_json::from_str(r#""-86.33""#).unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), r#""-86.33""#);
        assert!(serde_json::from_str::<Amount>("-86.33").is_err());
    }
}
