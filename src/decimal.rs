use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

/// Money as an integer count of the smallest currency unit.
///
/// All persisted amounts are whole units; only intermediate rate math uses
/// [`Decimal`], and it is rounded back to an integer before leaving the
/// pricing layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default, Hash,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);
    pub const ONE: Money = Money(1);

    /// create from a count of smallest currency units
    pub fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// get the underlying unit count
    pub fn as_units(&self) -> i64 {
        self.0
    }

    /// get as decimal for rate arithmetic
    pub fn as_decimal(&self) -> Decimal {
        Decimal::from(self.0)
    }

    /// check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// check if strictly positive
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// check if negative
    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// minimum of two values
    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    /// maximum of two values
    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// divide across `parts` equal periods, rounding up so the parts never
    /// under-cover the whole
    pub fn ceil_div(self, parts: u32) -> Self {
        debug_assert!(parts > 0);
        let parts = i64::from(parts);
        Money((self.0 + parts - 1).div_euclid(parts))
    }

    /// round a decimal amount half-away-from-zero to whole units
    pub fn from_decimal_rounded(d: Decimal) -> Self {
        let rounded = d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        Money(rounded.to_i64().unwrap_or(i64::MAX))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Money(s.parse()?))
    }
}

impl From<i64> for Money {
    fn from(units: i64) -> Self {
        Money(units)
    }
}

impl From<u32> for Money {
    fn from(units: u32) -> Self {
        Money(i64::from(units))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 -= other.0;
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, count: u32) -> Money {
        Money(self.0 * i64::from(count))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

/// rate type for fee rates and ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// create from decimal (e.g., 0.025 for 2.5%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from percentage (e.g., 5 for 5%)
    pub fn from_percentage(p: u32) -> Self {
        Rate(Decimal::from(p) / Decimal::from(100))
    }

    /// create from basis points (e.g., 250 for 2.5%)
    pub fn from_bps(bps: u32) -> Self {
        Rate(Decimal::from(bps) / Decimal::from(10000))
    }

    /// get as decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// get as percentage
    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::from(100)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}
