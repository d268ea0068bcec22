//! Exact currency amounts in the smallest unit.
//!
//! Nodes encode balances as JSON numbers. `serde_json` reads integers up to
//! `u64::MAX` exactly and anything else as `f64`, so a balance is accepted
//! from a JSON integer or a decimal string and rejected otherwise. A lossy
//! value is a decode error, never a rounded amount.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors from parsing a balance string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    #[error("empty amount")]
    Empty,

    #[error("invalid amount '{0}'")]
    Invalid(String),

    #[error("amount '{input}' has more than {max} decimal places")]
    TooPrecise { input: String, max: u32 },
}

/// Non-negative integer amount of the smallest currency unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Balance(BigUint);

impl Balance {
    pub fn zero() -> Self {
        Self(BigUint::default())
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Render as a fixed-point string with exactly `decimals` fractional digits.
    pub fn format_units(&self, decimals: u32) -> String {
        let digits = self.0.to_str_radix(10);
        let decimals = decimals as usize;
        if decimals == 0 {
            return digits;
        }
        let padded = if digits.len() <= decimals {
            format!("{}{digits}", "0".repeat(decimals + 1 - digits.len()))
        } else {
            digits
        };
        let (whole, frac) = padded.split_at(padded.len() - decimals);
        format!("{whole}.{frac}")
    }

    /// Parse a human amount such as `"10.00"` into smallest units.
    pub fn parse_units(input: &str, decimals: u32) -> Result<Self, BalanceError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(BalanceError::Empty);
        }
        let (whole, frac) = input.split_once('.').unwrap_or((input, ""));
        if frac.len() > decimals as usize {
            return Err(BalanceError::TooPrecise {
                input: input.to_owned(),
                max: decimals,
            });
        }
        if whole.is_empty() && frac.is_empty() {
            return Err(BalanceError::Invalid(input.to_owned()));
        }
        let digits = format!(
            "{}{frac}{}",
            if whole.is_empty() { "0" } else { whole },
            "0".repeat(decimals as usize - frac.len())
        );
        parse_digits(&digits).ok_or_else(|| BalanceError::Invalid(input.to_owned()))
    }
}

fn parse_digits(s: &str) -> Option<Balance> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(s.as_bytes(), 10).map(Balance)
}

impl From<u64> for Balance {
    fn from(v: u64) -> Self {
        Self(BigUint::from(v))
    }
}

impl From<BigUint> for Balance {
    fn from(v: BigUint) -> Self {
        Self(v)
    }
}

impl FromStr for Balance {
    type Err = BalanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(BalanceError::Empty);
        }
        parse_digits(s).ok_or_else(|| BalanceError::Invalid(s.to_owned()))
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Balance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_str_radix(10))
    }
}

struct BalanceVisitor;

impl<'de> Visitor<'de> for BalanceVisitor {
    type Value = Balance;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer or a decimal digit string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Balance, E> {
        Ok(Balance::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Balance, E> {
        u64::try_from(v)
            .map(Balance::from)
            .map_err(|_| E::custom(format!("negative balance {v}")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Balance, E> {
        Err(E::custom(format!(
            "balance {v} is not an exact integer on the wire"
        )))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Balance, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Balance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(BalanceVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_amount_is_exact() {
        let b: Balance = serde_json::from_value(json!(500000000)).unwrap();
        assert_eq!(b, Balance::from(500_000_000));
        assert_eq!(b.to_string(), "500000000");
    }

    #[test]
    fn u64_max_survives() {
        let b: Balance = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(b, Balance::from(u64::MAX));
    }

    #[test]
    fn string_amount_beyond_u64() {
        let b: Balance = serde_json::from_value(json!("340282366920938463463374607431768211456")).unwrap();
        assert_eq!(b.to_string(), "340282366920938463463374607431768211456");
    }

    #[test]
    fn lossy_amounts_rejected() {
        assert!(serde_json::from_value::<Balance>(json!(1.5)).is_err());
        assert!(serde_json::from_str::<Balance>("1e20").is_err());
        assert!(serde_json::from_str::<Balance>("100000000000000000000000").is_err());
        assert!(serde_json::from_value::<Balance>(json!(-1)).is_err());
        assert!(serde_json::from_value::<Balance>(json!("12a")).is_err());
    }

    #[test]
    fn format_units_pads_fraction() {
        assert_eq!(Balance::from(500_000_000).format_units(9), "0.500000000");
        assert_eq!(Balance::from(10_000_000_000).format_units(9), "10.000000000");
        assert_eq!(Balance::from(7).format_units(9), "0.000000007");
        assert_eq!(Balance::zero().format_units(9), "0.000000000");
        assert_eq!(Balance::from(42).format_units(0), "42");
    }

    #[test]
    fn parse_units_round_trips_display() {
        assert_eq!(Balance::parse_units("10.00", 9).unwrap(), Balance::from(10_000_000_000));
        assert_eq!(Balance::parse_units("1", 9).unwrap(), Balance::from(1_000_000_000));
        assert_eq!(Balance::parse_units(".5", 9).unwrap(), Balance::from(500_000_000));
        assert_eq!(
            Balance::parse_units("0.0000000001", 9),
            Err(BalanceError::TooPrecise { input: "0.0000000001".into(), max: 9 })
        );
        assert!(Balance::parse_units("1.2.3", 9).is_err());
        assert!(Balance::parse_units("", 9).is_err());
        assert!(Balance::parse_units(".", 9).is_err());
    }

    #[test]
    fn ordering_is_numeric() {
        assert!(Balance::from(10) > Balance::from(9));
        assert!("100".parse::<Balance>().unwrap() > "99".parse::<Balance>().unwrap());
    }
}
