//! # Money Module
//!
//! Provides the `Money` and `PreciseMoney` types for handling monetary values.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A 12.5% discount with 18% GST on ₹33.33 drifts a little on every       │
//! │  line and the drift piles up in the day's GST report.                   │
//! │                                                                         │
//! │  OUR SOLUTION: Two integer scales                                       │
//! │    Money        - whole paise (1 ₹ = 100 paise). Prices, revenue.       │
//! │    PreciseMoney - 10^-8 paise. Discount, taxable amount, GST.           │
//! │                                                                         │
//! │  Basis-point rates applied to whole paise always land on an exact       │
//! │  PreciseMoney value, so sums never drift. Rounding to 2 decimals        │
//! │  happens once, when a value is shown.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kirana_core::money::{Money, PreciseMoney};
//!
//! let price = Money::from_paise(12000); // ₹120.00
//! let gross = price * 2;                 // ₹240.00
//!
//! let exact = PreciseMoney::from_money(gross).apply_bps(500); // 5% of it
//! assert_eq!(exact.round_to_paise().paise(), 1200);           // ₹12.00
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Basis points in 100%.
pub const BPS_SCALE: i128 = 10_000;

/// Number of `PreciseMoney` units in one paisa.
///
/// Two basis-point multiplications (discount, then GST) need 10^8 to stay exact.
pub const PRECISE_UNITS_PER_PAISA: i128 = 100_000_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole paise (the smallest rupee unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for differences and adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// Product.price_paise ──► line gross (price × qty) ──► PreciseMoney math
///                    │
///                    └──► top-products revenue (snapshot price × qty)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::money::Money;
    ///
    /// let price = Money::from_paise(6500); // ₹65.00
    /// assert_eq!(price.paise(), 6500);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from rupees and paise.
    ///
    /// For negative amounts only the rupee part carries the sign:
    /// `from_rupees_paise(-5, 50)` is -₹5.50.
    ///
    /// ```rust
    /// use kirana_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees_paise(10, 99).paise(), 1099);
    /// assert_eq!(Money::from_rupees_paise(-5, 50).paise(), -550);
    /// ```
    #[inline]
    pub const fn from_rupees_paise(rupees: i64, paise: i64) -> Self {
        if rupees < 0 {
            Money(rupees * 100 - paise)
        } else {
            Money(rupees * 100 + paise)
        }
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// Validated prices and stock never reach saturation; it only guards
    /// values read back from storage without validation.
    ///
    /// ```rust
    /// use kirana_core::money::Money;
    ///
    /// let unit_price = Money::from_paise(3500); // Bread ₹35
    /// assert_eq!(unit_price.multiply_quantity(3).paise(), 10500);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

/// Shows money as `₹12.34`. Use `PosConfig::format_currency` for
/// configurable symbols.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// PreciseMoney Type
// =============================================================================

/// A monetary value in units of 10^-8 paise.
///
/// Derived amounts (line discount, taxable amount, GST, transaction totals,
/// report sums) are carried at this scale so that aggregation is exact.
/// Convert to [`Money`] with [`PreciseMoney::round_to_paise`] only when the
/// value is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PreciseMoney(i128);

impl PreciseMoney {
    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        PreciseMoney(0)
    }

    /// Lifts whole paise to the precise scale.
    #[inline]
    pub const fn from_money(money: Money) -> Self {
        PreciseMoney(money.paise() as i128 * PRECISE_UNITS_PER_PAISA)
    }

    /// Raw value in 10^-8 paise.
    #[inline]
    pub const fn units(&self) -> i128 {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns `self × bps / 10000`.
    ///
    /// Exact whenever `self` is a multiple of 10^4 units, which holds for
    /// anything derived from whole paise by at most one prior basis-point
    /// step. That covers `gross × discount` and `taxable × GST`.
    #[inline]
    pub const fn apply_bps(&self, bps: u32) -> Self {
        PreciseMoney(self.0 * bps as i128 / BPS_SCALE)
    }

    /// Divides by a count, truncating toward zero. Returns zero for `count == 0`.
    pub fn div_count(&self, count: usize) -> Self {
        if count == 0 {
            return PreciseMoney::zero();
        }
        PreciseMoney(self.0 / count as i128)
    }

    /// Rounds to whole paise, half away from zero.
    ///
    /// ```rust
    /// use kirana_core::money::{Money, PreciseMoney};
    ///
    /// // ₹10.00 × 8.25% = ₹0.825 → ₹0.83
    /// let tax = PreciseMoney::from_money(Money::from_paise(1000)).apply_bps(825);
    /// assert_eq!(tax.round_to_paise().paise(), 83);
    /// ```
    pub fn round_to_paise(&self) -> Money {
        let whole = self.0 / PRECISE_UNITS_PER_PAISA;
        let rem = self.0 % PRECISE_UNITS_PER_PAISA;
        let rounded = if rem.abs() * 2 >= PRECISE_UNITS_PER_PAISA {
            whole + self.0.signum()
        } else {
            whole
        };
        Money::from_paise(rounded as i64)
    }
}

impl fmt::Display for PreciseMoney {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.round_to_paise().fmt(f)
    }
}

impl Default for PreciseMoney {
    fn default() -> Self {
        PreciseMoney::zero()
    }
}

impl From<Money> for PreciseMoney {
    fn from(money: Money) -> Self {
        PreciseMoney::from_money(money)
    }
}

impl Add for PreciseMoney {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        PreciseMoney(self.0 + other.0)
    }
}

impl AddAssign for PreciseMoney {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for PreciseMoney {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        PreciseMoney(self.0 - other.0)
    }
}

impl Sum for PreciseMoney {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(PreciseMoney::zero(), Add::add)
    }
}

impl<'a> Sum<&'a PreciseMoney> for PreciseMoney {
    fn sum<I: Iterator<Item = &'a PreciseMoney>>(iter: I) -> Self {
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
    fn test_from_paise() {
        let money = Money::from_paise(1099);
        assert_eq!(money.paise(), 1099);
        assert_eq!(money.rupees(), 10);
        assert_eq!(money.paise_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paise(1099)), "₹10.99");
        assert_eq!(format!("{}", Money::from_paise(500)), "₹5.00");
        assert_eq!(format!("{}", Money::from_paise(-550)), "-₹5.50");
        assert_eq!(format!("{}", Money::from_paise(0)), "₹0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!((a * 3).paise(), 3000);
        assert_eq!(vec![a, b, b].into_iter().sum::<Money>().paise(), 2000);
    }

    #[test]
    fn test_multiply_quantity_saturates() {
        let price = Money::from_paise(i64::MAX / 2 + 1);
        assert_eq!(price.multiply_quantity(2).paise(), i64::MAX);
        assert_eq!(Money::from_paise(-5).multiply_quantity(i64::MAX).paise(), i64::MIN);
    }

    #[test]
    fn test_apply_bps_exact_after_two_steps() {
        // ₹33.33 with 12.5% off, then 18% GST
        let gross = PreciseMoney::from_money(Money::from_paise(3333));
        let discount = gross.apply_bps(1250);
        let taxable = gross - discount;
        let tax = taxable.apply_bps(1800);

        // 3333 × 0.125 = 416.625 paise
        assert_eq!(discount.units(), 41_662_500_000);
        // 2916.375 × 0.18 = 524.9475 paise
        assert_eq!(tax.units(), 52_494_750_000);
        assert_eq!(tax.round_to_paise().paise(), 525);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        let half = PreciseMoney(PRECISE_UNITS_PER_PAISA / 2);
        assert_eq!(half.round_to_paise().paise(), 1);

        let neg_half = PreciseMoney(-PRECISE_UNITS_PER_PAISA / 2);
        assert_eq!(neg_half.round_to_paise().paise(), -1);

        let just_under = PreciseMoney(PRECISE_UNITS_PER_PAISA / 2 - 1);
        assert_eq!(just_under.round_to_paise().paise(), 0);
    }

    /// Rounding once at the end differs from rounding every line.
    #[test]
    fn test_aggregate_then_round() {
        // Three lines of ₹0.05 at 5% GST: 0.25 paise each
        let line_tax = PreciseMoney::from_money(Money::from_paise(5)).apply_bps(500);
        let per_line_rounded: i64 = (0..3).map(|_| line_tax.round_to_paise().paise()).sum();
        let total: PreciseMoney = (0..3).map(|_| line_tax).sum();

        assert_eq!(per_line_rounded, 0);
        assert_eq!(total.round_to_paise().paise(), 1);
    }

    #[test]
    fn test_div_count_zero_is_zero() {
        let amount = PreciseMoney::from_money(Money::from_paise(900));
        assert!(amount.div_count(0).is_zero());
        assert_eq!(amount.div_count(3).round_to_paise().paise(), 300);
    }
}
