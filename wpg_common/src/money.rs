use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

//--------------------------------------       Money       -----------------------------------------------------------
/// A currency-less monetary amount with two-decimal precision, stored as an integer number of cents.
///
/// The payment gateways exchange amounts as fixed two-decimal strings (e.g. `"100.00"`), so parsing and
/// formatting round-trip through that representation exactly, without any floating point involvement.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

#[derive(Debug, Clone, Error)]
#[error("Not a valid monetary amount: {0}")]
pub struct MoneyParseError(String);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }
}

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    /// Parses amounts of the form `123`, `123.4` or `123.45`. More than two decimals is an error, since a
    /// gateway sending sub-cent amounts would otherwise be silently truncated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() || frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(MoneyParseError(s.to_string()));
        }
        let whole = whole.parse::<i64>().map_err(|_| MoneyParseError(s.to_string()))?;
        let frac = if frac.is_empty() { 0 } else { frac.parse::<i64>().unwrap_or(0) * if frac.len() == 1 { 10 } else { 1 } };
        let cents = whole * 100 + frac;
        Ok(Self(if negative { -cents } else { cents }))
    }
}
