//! Fixed-point money and quantity types.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Both types wrap `rust_decimal::Decimal` (integer mantissa + scale), so sums
//! of debits and credits compare exactly. Intermediate results are kept
//! unrounded; `round()` applies round-half-even and belongs at output
//! boundaries only.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// A monetary amount in the organization's functional currency.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Number of decimal places amounts are rounded to at output boundaries.
    pub const SCALE: u32 = 2;

    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wraps a decimal value without rounding it.
    #[must_use]
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Creates an amount from integer minor units (e.g. cents).
    #[must_use]
    pub fn from_minor(minor: i64) -> Self {
        Self(Decimal::new(minor, Self::SCALE))
    }

    /// Returns the underlying decimal value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns true if the amount is strictly less than zero.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[must_use]
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Multiplies by a plain rate (e.g. `0.5`). The result is not rounded.
    #[must_use]
    pub fn mul_rate(self, rate: Decimal) -> Self {
        Self(self.0 * rate)
    }

    /// Applies a percentage rate (e.g. `18` for 18%). The result is not rounded.
    #[must_use]
    pub fn percent(self, rate_percent: Decimal) -> Self {
        Self(self.0 * rate_percent / HUNDRED)
    }

    /// Rounds to [`Amount::SCALE`] places using round-half-even.
    #[must_use]
    pub fn round(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// Allocates this amount across `weights` using the Largest Remainder Method.
    ///
    /// The amount is rounded first; the returned parts are rounded and sum
    /// exactly to the rounded amount. Zero or empty weights yield an empty vec.
    #[must_use]
    pub fn allocate(self, weights: &[Decimal]) -> Vec<Self> {
        let weight_total: Decimal = weights.iter().copied().sum();
        if weights.is_empty() || weight_total.is_zero() {
            return vec![];
        }

        let total = self.round().0;
        let unit = Decimal::new(1, Self::SCALE);

        let exact: Vec<Decimal> = weights.iter().map(|w| total * *w / weight_total).collect();
        let mut parts: Vec<Decimal> = exact
            .iter()
            .map(|a| a.round_dp_with_strategy(Self::SCALE, RoundingStrategy::ToZero))
            .collect();

        let remainder = total - parts.iter().copied().sum::<Decimal>();
        let step = if remainder.is_sign_negative() { -unit } else { unit };
        let units = (remainder / unit)
            .abs()
            .trunc()
            .to_usize()
            .unwrap_or(0);

        // Largest fractional remainders receive the extra units first.
        let mut order: Vec<usize> = (0..parts.len()).collect();
        order.sort_by(|&a, &b| {
            let ra = (exact[a] - parts[a]).abs();
            let rb = (exact[b] - parts[b]).abs();
            rb.cmp(&ra).then(a.cmp(&b))
        });
        for &index in order.iter().cycle().take(units) {
            parts[index] += step;
        }

        parts.into_iter().map(Self).collect()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.round().0)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// A stock quantity, supporting fractional units (weight, volume).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Number of decimal places quantities are rounded to at output boundaries.
    pub const SCALE: u32 = 4;

    /// The zero quantity.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wraps a decimal value without rounding it.
    #[must_use]
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Creates a quantity from a whole number of units.
    #[must_use]
    pub fn units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Returns the underlying decimal value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Returns true if the quantity is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the quantity is strictly greater than zero.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns true if the quantity is strictly less than zero.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Values this quantity at `unit_cost`. The result is not rounded.
    #[must_use]
    pub fn times(self, unit_cost: Decimal) -> Amount {
        Amount(self.0 * unit_cost)
    }

    /// Rounds to [`Quantity::SCALE`] places using round-half-even.
    #[must_use]
    pub fn round(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointNearestEven),
        )
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.round().0.normalize())
    }
}

impl From<Decimal> for Quantity {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl Add for Quantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Quantity {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Quantity> for Quantity {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
#[path = "money_tests.rs"]
mod tests;
