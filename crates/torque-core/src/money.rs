//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The REST API sends rupee amounts as JSON numbers:                     │
//! │    { "unitPrice": 499.99, "quantity": 3 }                              │
//! │                                                                         │
//! │  Summing floats drifts:  0.1 + 0.2 = 0.30000000000000004               │
//! │                                                                         │
//! │  OUR SOLUTION: convert once, at the edge, into integer paise           │
//! │    from_decimal(1675.60) ──► Money(167560)                             │
//! │    every derived step (discount, GST) stays in integers                │
//! │    serialized as rupees again: 167560 ──► 1675.6                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding
//! All conversions and percentage steps round half-up (half away from zero),
//! matching the two-decimal display of the portal.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Rate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 rupee).
///
/// ## Where Money is Used
/// ```text
/// MaterialLine.quantity × unit_price ──┐
///                                      ├──► InvoiceTotals ──► GenerateInvoice body
/// LaborLine.hours × rate ──────────────┘          │
///                                                 └──► "₹1675.60" in tables / PDF
/// ```
///
/// Serializes as a decimal rupee amount (`1675.6`), the unit the REST API and
/// `--json` output use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    ///
    /// ## Example
    /// ```rust
    /// use torque_core::money::Money;
    ///
    /// let price = Money::from_paise(49_999); // ₹499.99
    /// assert_eq!(price.paise(), 49_999);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from rupees and paise.
    ///
    /// For negative amounts, only the rupee part should be negative.
    #[inline]
    pub const fn from_major_minor(rupees: i64, paise: i64) -> Self {
        if rupees < 0 {
            Money(rupees * 100 - paise)
        } else {
            Money(rupees * 100 + paise)
        }
    }

    /// Converts a decimal amount from a JSON payload, rounding half-up to paise.
    ///
    /// Non-finite input (NaN, infinity) becomes zero.
    ///
    /// ## Example
    /// ```rust
    /// use torque_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(255.6).paise(), 25_560);
    /// assert_eq!(Money::from_decimal(0.125).paise(), 13);
    /// assert_eq!(Money::from_decimal(f64::NAN), Money::zero());
    /// ```
    pub fn from_decimal(amount: f64) -> Self {
        if !amount.is_finite() {
            return Money::zero();
        }
        // f64::round is half away from zero
        Money((amount * 100.0).round() as i64)
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

    /// Returns the value as a decimal rupee amount, for request bodies.
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Applies a rate and rounds the result half-up to the paisa.
    ///
    /// ## Implementation
    /// Integer math on the magnitude: `(|amount| * bps + 5000) / 10000`,
    /// then the sign is restored, so -0.5 paise rounds to -1 like +0.5 rounds to 1.
    ///
    /// ## Example
    /// ```rust
    /// use torque_core::money::Money;
    /// use torque_core::types::Rate;
    ///
    /// let subtotal = Money::from_paise(142_000);            // ₹1420.00
    /// let gst = subtotal.apply_rate(Rate::from_bps(1800));  // 18%
    /// assert_eq!(gst.paise(), 25_560);                      // ₹255.60
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        let magnitude = (self.0.unsigned_abs() as u128 * rate.bps() as u128 + 5000) / 10000;
        let magnitude = magnitude as i64;
        if self.0 < 0 {
            Money(-magnitude)
        } else {
            Money(magnitude)
        }
    }

    /// Formats without the currency symbol: `1675.60`.
    ///
    /// Used where the rupee glyph is unavailable (built-in PDF fonts).
    pub fn to_plain_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the amount the way the portal tables do: `₹1675.60`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Money::from_decimal)
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
