use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Currency amount held as integer minor units (two-decimal precision).
///
/// Integer arithmetic keeps the fee-split invariant exact: no float drift
/// between `platform_fee + net_amount` and the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    minor: i64,
}

/// Decimal places carried by [`Money`].
pub const CURRENCY_PRECISION: u32 = 2;

const MINOR_PER_MAJOR: i64 = 100;

impl Money {
    pub const ZERO: Money = Money { minor: 0 };

    pub fn from_minor(minor: i64) -> Self {
        Self { minor }
    }

    /// Saturates at the representable bound rather than wrapping.
    pub fn from_major(major: i64) -> Self {
        Self {
            minor: major.saturating_mul(MINOR_PER_MAJOR),
        }
    }

    pub fn minor_units(&self) -> i64 {
        self.minor
    }

    pub fn is_positive(&self) -> bool {
        self.minor > 0
    }

    pub fn is_negative(&self) -> bool {
        self.minor < 0
    }

    /// Percentage share of this amount, rounded half away from zero to the
    /// currency precision.
    pub fn percent(&self, rate: f64) -> Money {
        let raw = self.minor as f64 * rate / 100.0;
        Money {
            minor: raw.round() as i64,
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money {
            minor: self.minor + rhs.minor,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money {
            minor: self.minor - rhs.minor,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor < 0 { "-" } else { "" };
        let abs = self.minor.unsigned_abs();
        write!(
            f,
            "{}{}.{:02}",
            sign,
            abs / MINOR_PER_MAJOR as u64,
            abs % MINOR_PER_MAJOR as u64
        )
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid money amount: {0}")]
pub struct ParseMoneyError(String);

impl FromStr for Money {
    type Err = ParseMoneyError;

    /// Parses a plain decimal string ("1200", "1200.5", "1200.00").
    /// More than two fractional digits is rejected rather than rounded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (sign, digits) = match s.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, s),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(ParseMoneyError(s.to_string()));
        }
        if frac.len() > CURRENCY_PRECISION as usize {
            return Err(ParseMoneyError(s.to_string()));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| ParseMoneyError(s.to_string()))?
        };

        let mut frac_minor: i64 = 0;
        if !frac.is_empty() {
            let parsed: i64 = frac.parse().map_err(|_| ParseMoneyError(s.to_string()))?;
            frac_minor = if frac.len() == 1 { parsed * 10 } else { parsed };
        }

        // Amounts past the representable range are rejected, not wrapped.
        let minor = whole
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|m| m.checked_add(frac_minor))
            .and_then(|m| m.checked_mul(sign))
            .ok_or_else(|| ParseMoneyError(s.to_string()))?;

        Ok(Money { minor })
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
