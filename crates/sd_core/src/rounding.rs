//! Integer-first ratio type and percent helpers.
//!
//! Margins, shares and averages are exact rationals over integer cents. A zero
//! denominator yields `Err(DivisionUndefined)`; nothing here panics or falls
//! back to floats for the value itself.

use crate::errors::DivisionUndefined;
use crate::money::Money;

/// Exact ratio with normalized sign and positive denominator.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ratio {
    pub num: i128,
    pub den: i128,
}

fn gcd_i128(a: i128, b: i128) -> i128 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    if a == 0 { 1 } else { a }
}

/// Construct a ratio, ensuring `den > 0` and reducing by GCD.
pub fn new_ratio_checked(num: i128, den: i128) -> Result<Ratio, DivisionUndefined> {
    if den == 0 {
        return Err(DivisionUndefined);
    }
    let (mut n, mut d) = (num, den);
    if d < 0 {
        n = -n;
        d = -d;
    }
    let g = gcd_i128(n, d);
    Ok(Ratio { num: n / g, den: d / g })
}

/// `part / whole × 100` as an exact ratio.
pub fn percent_of(part: Money, whole: Money) -> Result<Ratio, DivisionUndefined> {
    new_ratio_checked(part.cents() * 100, whole.cents())
}

/// Nearest integer to `num / den` (den > 0), ties to even.
fn div_round_half_even(num: i128, den: i128) -> i128 {
    let q = num.div_euclid(den);
    let r = num.rem_euclid(den);
    let twice = 2 * r;
    if twice > den || (twice == den && q % 2 != 0) {
        q + 1
    } else {
        q
    }
}

impl Ratio {
    /// Value scaled by ten and rounded half-even (12.25 → 122, 12.35 → 124).
    pub fn tenths_half_even(&self) -> i128 {
        div_round_half_even(self.num * 10, self.den)
    }

    /// Nearest integer, ties to even.
    pub fn round_half_even(&self) -> i128 {
        div_round_half_even(self.num, self.den)
    }
}

/// One-decimal rendering of a percent ratio without float math: `"12.3"`, `"-0.5"`.
pub fn percent_one_decimal(r: &Ratio) -> String {
    let tenths = r.tenths_half_even();
    let sign = if tenths < 0 { "-" } else { "" };
    let abs = tenths.unsigned_abs();
    format!("{sign}{}.{}", abs / 10, abs % 10)
}
