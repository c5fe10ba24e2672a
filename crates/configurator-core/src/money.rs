//! # Money Module
//!
//! Provides the `Money` type for prices in the smallest currency unit.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing prices as floats:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Twelve switches at $0.35 accumulated as floats can render as $4.199…  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    35 × 12 = 420 → "$4.20", always                                      │
//! │    Division by 100 happens only when formatting                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use configurator_core::money::Money;
//!
//! let switch_price = Money::from_minor(35);
//! let line = switch_price.checked_mul_quantity(12).unwrap();
//!
//! assert_eq!(line.minor_units(), 420);
//! assert_eq!(line.format("$"), "$4.20");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: catalog prices come straight from the commerce backend
///   as integers; signed leaves room for adjustments
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serializes as a bare integer**: `{"price": 15000}` on the wire
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use configurator_core::money::Money;
    ///
    /// let price = Money::from_minor(15000); // $150.00
    /// assert_eq!(price.minor_units(), 15000);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (dollars).
    #[inline]
    pub const fn major_part(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
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

    /// Multiplies by a line quantity, returning `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use configurator_core::money::Money;
    ///
    /// let keycaps = Money::from_minor(4999);
    /// assert_eq!(keycaps.checked_mul_quantity(3), Some(Money::from_minor(14997)));
    /// assert_eq!(Money::from_minor(i64::MAX).checked_mul_quantity(2), None);
    /// ```
    #[inline]
    pub fn checked_mul_quantity(&self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(i64::from(quantity)).map(Money)
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Formats with the given currency symbol and two decimals.
    ///
    /// ## Example
    /// ```rust
    /// use configurator_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(15000).format("$"), "$150.00");
    /// assert_eq!(Money::from_minor(5).format("€"), "€0.05");
    /// assert_eq!(Money::from_minor(-550).format("$"), "-$5.50");
    /// ```
    pub fn format(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            self.major_part().abs(),
            self.minor_part()
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses a dollar sign; catalog-aware code calls [`Money::format`].
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format("$"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
