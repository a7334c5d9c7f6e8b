//! crates/sd_core/src/money.rs
//! Integer-cent money. Sums are exact; there is no float arithmetic here.
//!
//! A single parsed amount is bounded to the `i64` cent range while the value is
//! held as `i128`, so summing any realistic number of rows cannot overflow.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Sub};
use core::str::FromStr;

use crate::errors::CoreError;

/// An amount in whole cents.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Money(i128);

impl Money {
    pub const ZERO: Money = Money(0);

    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents as i128)
    }

    /// Amount from an aggregate cent count, e.g. a rounded average.
    #[inline]
    pub const fn from_total_cents(cents: i128) -> Self {
        Self(cents)
    }

    #[inline]
    pub const fn cents(self) -> i128 {
        self.0
    }

    /// Parse decimal text such as `"120.00"`, `"-3.5"`, `"1,234.56"`.
    ///
    /// Comma thousands separators are ignored. Digits past the second decimal
    /// place round half away from zero. Exponents and currency symbols are rejected,
    /// as are amounts outside the `i64` cent range.
    pub fn parse(text: &str) -> Result<Money, CoreError> {
        let m = Money::parse_total(text)?;
        if i64::try_from(m.0).is_err() {
            return Err(CoreError::InvalidMoney(text.to_string()));
        }
        Ok(m)
    }

    /// Same grammar as [`Money::parse`] without the per-amount bound, for
    /// reading back rendered totals.
    pub fn parse_total(text: &str) -> Result<Money, CoreError> {
        let bad = || CoreError::InvalidMoney(text.to_string());
        let s = text.trim();
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let body: String = body.chars().filter(|c| *c != ',').collect();
        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body.as_str(), ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(bad());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }

        let whole: i128 = if int_part.is_empty() { 0 } else { int_part.parse().map_err(|_| bad())? };
        let mut frac = frac_part.bytes().map(|b| i128::from(b - b'0'));
        let tenths = frac.next().unwrap_or(0);
        let hundredths = frac.next().unwrap_or(0);
        let round_up = frac.next().is_some_and(|d| d >= 5);

        let mut cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths))
            .ok_or_else(bad)?;
        if round_up {
            cents = cents.checked_add(1).ok_or_else(bad)?;
        }
        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Plain decimal rendering with two places, e.g. `-1234.50`.
    pub fn to_decimal_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }

    /// Whole currency units, rounding cents half away from zero.
    pub fn whole_units_rounded(self) -> i128 {
        let abs = self.0.unsigned_abs();
        let units = ((abs + 50) / 100) as i128;
        if self.0 < 0 { -units } else { units }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl FromStr for Money {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}
