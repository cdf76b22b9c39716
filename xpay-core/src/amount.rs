//! Arbitrary-precision, floating-point-free currency amounts.
//!
//! Every amount in this core is an unsigned integer count of base units
//! (§3: "no floating point anywhere in the core"). `u128` is used as the
//! backing representation; at today's token supplies and decimal counts this
//! has no practical ceiling, but callers must not assume it is unbounded —
//! arithmetic saturates rather than wraps, and overflow is surfaced as an error
//! instead of silently truncating a payment amount.
//!
//! Serializes as a decimal string, the same "string, not number" convention
//! `r402`'s `UnixTimestamp` uses for 64-bit values, so JSON parsers that treat
//! all numbers as `f64` (e.g. `JavaScript`) cannot lose precision on a payment amount.

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An unsigned, arbitrary-precision amount of an asset's base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Amount(u128);

/// Error returned when parsing a malformed amount string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid amount: {0}")]
pub struct AmountParseError(pub String);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from a raw base-unit count.
    #[must_use]
    pub const fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    /// Returns the raw base-unit count.
    #[must_use]
    pub const fn base_units(self) -> u128 {
        self.0
    }

    /// Checked addition; `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction; `None` if `rhs` exceeds `self`.
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// The signed difference `self - rhs`, usable for delta comparisons
    /// against a fee tolerance (§4.3) without panicking on underflow.
    #[must_use]
    pub fn signed_diff(self, rhs: Self) -> i128 {
        i128::try_from(self.0).unwrap_or(i128::MAX) - i128::try_from(rhs.0).unwrap_or(i128::MAX)
    }

    /// Renders this amount as a decimal string with `decimals` fractional
    /// digits, e.g. `Amount::from_base_units(1_500_000).to_decimal_string(6)
    /// == "1.5"`.
    ///
    /// This is a presentation-boundary helper only; nothing inside this core
    /// compares or verifies amounts via their decimal rendering.
    #[must_use]
    pub fn to_decimal_string(self, decimals: u8) -> String {
        if decimals == 0 {
            return self.0.to_string();
        }
        let decimals = decimals as usize;
        let digits = self.0.to_string();
        let padded = if digits.len() <= decimals {
            format!("{:0>width$}", digits, width = decimals + 1)
        } else {
            digits
        };
        let split_at = padded.len() - decimals;
        let (whole, frac) = padded.split_at(split_at);
        let frac = frac.trim_end_matches('0');
        if frac.is_empty() {
            whole.to_owned()
        } else {
            format!("{whole}.{frac}")
        }
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.checked_add(rhs).expect("amount addition overflowed")
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.checked_sub(rhs)
            .expect("amount subtraction underflowed")
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u128>()
            .map(Self)
            .map_err(|_| AmountParseError(s.to_owned()))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_rendering() {
        assert_eq!(Amount::from_base_units(1_500_000).to_decimal_string(6), "1.5");
        assert_eq!(Amount::from_base_units(20_000).to_decimal_string(6), "0.02");
        assert_eq!(Amount::from_base_units(1_000_000).to_decimal_string(6), "1");
        assert_eq!(Amount::from_base_units(42).to_decimal_string(0), "42");
    }

    #[test]
    fn signed_diff_handles_fee_slack() {
        let expected = Amount::from_base_units(1_000_000_000);
        let observed = Amount::from_base_units(999_997_000);
        assert_eq!((observed.signed_diff(expected)).abs(), 3_000);
    }

    #[test]
    fn json_roundtrip_is_string_not_number() {
        let amount = Amount::from_base_units(20_000);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"20000\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn checked_sub_rejects_underflow() {
        assert!(Amount::from_base_units(1)
            .checked_sub(Amount::from_base_units(2))
            .is_none());
    }
}
