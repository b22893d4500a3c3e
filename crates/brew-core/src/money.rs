//! Exact currency amounts
//!
//! Prices, taxes and totals are carried as [`Decimal`] so sums never drift.
//! Rounding to cents happens only in `Display`.

use rust_decimal::RoundingStrategy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

/// A dollar amount
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Amount from whole cents, `Money::from_cents(350)` is $3.50
    #[inline]
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    #[inline]
    #[must_use]
    pub fn amount(self) -> Decimal {
        self.0
    }

    /// Multiply by a rate such as a tax rate
    #[inline]
    #[must_use]
    pub fn scale(self, rate: Decimal) -> Self {
        Self(self.0 * rate)
    }

    /// Rounded to cents, half away from zero
    #[inline]
    #[must_use]
    pub fn rounded(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cents = self.rounded().0;
        cents.rescale(2);
        write!(f, "${cents}")
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, rhs: u32) -> Money {
        Money(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_pads_and_rounds() {
        assert_eq!(Money::from_cents(350).to_string(), "$3.50");
        assert_eq!(Money::from_cents(0).to_string(), "$0.00");
        assert_eq!(Money(Decimal::new(5565, 4)).to_string(), "$0.56");
        assert_eq!(Money(Decimal::new(5, 3)).to_string(), "$0.01");
        assert_eq!(Money(Decimal::from(12)).to_string(), "$12.00");
    }

    #[test]
    fn arithmetic_stays_exact() {
        let subtotal = Money::from_cents(350) * 2 + Money::from_cents(500);
        assert_eq!(subtotal, Money::from_cents(1200));
        let tax = subtotal.scale(Decimal::new(8, 2));
        assert_eq!(tax, Money::from_cents(96));
        assert_eq!(subtotal + tax + Money::from_cents(399), Money::from_cents(1695));
    }
}
