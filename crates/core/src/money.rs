//! Monetary amounts in integer minor units (paise).
//!
//! Balances must hold bit-exactly, so amounts never touch floating point:
//! storage is `i64` minor units and validation sums run in `i128`.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Signed amount in minor units.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Checked addition; fails rather than wrapping.
    pub fn checked_add(self, other: Money) -> Result<Money, DomainError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(DomainError::AmountOverflow)
    }

    /// Checked subtraction; fails rather than wrapping.
    pub fn checked_sub(self, other: Money) -> Result<Money, DomainError> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or(DomainError::AmountOverflow)
    }

    pub fn checked_neg(self) -> Result<Money, DomainError> {
        self.0.checked_neg().map(Money).ok_or(DomainError::AmountOverflow)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for Money {
    fn from(minor: i64) -> Self {
        Money(minor)
    }
}

impl core::iter::Sum<Money> for i128 {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> i128 {
        iter.map(|m| m.0 as i128).sum()
    }
}
