//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE PASS-ORDERING PROBLEM                                              │
//! │                                                                         │
//! │  The pricing pipeline taxes an item, discounts it, then taxes it again. │
//! │  With floats, running the pipeline twice on the same order can drift:   │
//! │    0.2 × 89.99 = 17.998000000000001  → next run sees a different base   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + explicit rounding                        │
//! │    8999 cents × 2000 bps / 10000 = 1799.8 → 1800 cents, every run       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let total = price + Money::from_cents(500);
//! assert_eq!(total.cents(), 1599);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Rate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: discounts are negative adjustments, so the sign carries
///   meaning throughout the pipeline
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Transparent serde**: serialized as a bare integer
///
/// ## Where Money Flows
/// ```text
/// OrderLine.unit_price ──► OrderItem.unit_price ──► unit_price_with_promotions
///                                                        │
///                           Adjustment.amount (TAX) ◄────┘
///                                    │
///          OrderLine.total_price ◄───┘──► Order.sub_total ──► Order.total()
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns `rate` of this amount, rounded half away from zero.
    ///
    /// This is the single primitive behind tax on a net price and
    /// percentage discounts.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    /// use tally_core::types::Rate;
    ///
    /// let price = Money::from_cents(1000); // $10.00
    /// let rate = Rate::from_bps(825);      // 8.25%
    ///
    /// // $10.00 × 8.25% = $0.825 → rounds to $0.83
    /// assert_eq!(price.portion(rate).cents(), 83);
    /// ```
    pub fn portion(&self, rate: Rate) -> Money {
        // i128 keeps large amounts × bps from overflowing
        let cents = div_round(self.0 as i128 * rate.bps() as i128, 10_000);
        Money::from_cents(cents as i64)
    }

    /// Calculates tax payable on a net (tax-exclusive) amount.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    /// use tally_core::types::Rate;
    ///
    /// let net = Money::from_cents(9000);
    /// assert_eq!(net.calculate_tax(Rate::from_percent(20)).cents(), 1800);
    /// ```
    #[inline]
    pub fn calculate_tax(&self, rate: Rate) -> Money {
        self.portion(rate)
    }

    /// Returns the net amount contained in a gross (tax-inclusive) amount.
    ///
    /// `gross / (1 + rate)`, rounded half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    /// use tally_core::types::Rate;
    ///
    /// let gross = Money::from_cents(1200);
    /// assert_eq!(gross.net_of(Rate::from_percent(20)).cents(), 1000);
    /// ```
    pub fn net_of(&self, rate: Rate) -> Money {
        let cents = div_round(self.0 as i128 * 10_000, 10_000 + rate.bps() as i128);
        Money::from_cents(cents as i64)
    }

    /// Returns the tax already contained in a gross (tax-inclusive) amount.
    #[inline]
    pub fn tax_included(&self, rate: Rate) -> Money {
        *self - self.net_of(rate)
    }
}

/// Integer division rounding half away from zero.
fn div_round(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator.abs() {
        if (numerator < 0) != (denominator < 0) {
            quotient - 1
        } else {
            quotient + 1
        }
    } else {
        quotient
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-oriented rendering; storefronts do their own localisation.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_cents(100), Money::from_cents(-30), Money::from_cents(5)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.cents(), 75);
    }

    #[test]
    fn test_tax_on_discounted_price() {
        // 20% of $90.00, not of the $100.00 list price
        let tax = Money::from_cents(9000).calculate_tax(Rate::from_percent(20));
        assert_eq!(tax.cents(), 1800);
    }

    #[test]
    fn test_portion_rounds_half_away_from_zero() {
        let rate = Rate::from_bps(825);
        assert_eq!(Money::from_cents(1000).portion(rate).cents(), 83);
        assert_eq!(Money::from_cents(-1000).portion(rate).cents(), -83);
        assert_eq!(Money::from_cents(-1000).portion(Rate::from_percent(10)).cents(), -100);
    }

    #[test]
    fn test_net_and_included_tax() {
        let rate = Rate::from_percent(20);
        let gross = Money::from_cents(5000);
        assert_eq!(gross.net_of(rate).cents(), 4167);
        assert_eq!(gross.tax_included(rate).cents(), 833);
        assert_eq!(gross.net_of(Rate::zero()), gross);
    }

    #[test]
    fn test_zero() {
        assert!(Money::zero().is_zero());
        assert_eq!(Money::default(), Money::zero());
    }
}
