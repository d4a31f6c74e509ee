//! Delegate fee rate.
//!
//! Fee rates are configured as fractions (`0.05` = 5%) but are held as an
//! integer number of parts-per-million so that all money arithmetic stays in
//! integers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Result, TypesError};

/// Parts-per-million denominator for [`FeeRate`].
pub const PPM: u64 = 1_000_000;

/// A delegate fee rate in [0, 1], stored as parts-per-million.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "f64", into = "f64")]
pub struct FeeRate(u32);

impl FeeRate {
    /// A zero fee: the delegate keeps nothing.
    pub const ZERO: FeeRate = FeeRate(0);

    /// Build a fee rate from a fraction such as `0.1`.
    ///
    /// # Errors
    ///
    /// - [`TypesError::InvalidFeeRate`] if the value is NaN, infinite, or
    ///   outside [0, 1]
    pub fn from_fraction(fraction: f64) -> Result<Self> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(TypesError::InvalidFeeRate(fraction));
        }
        // Bounded by PPM, so the cast cannot truncate.
        Ok(Self((fraction * PPM as f64).round() as u32))
    }

    /// Parts-per-million value.
    pub fn ppm(self) -> u32 {
        self.0
    }

    /// Fraction value, for display only.
    pub fn as_fraction(self) -> f64 {
        f64::from(self.0) / PPM as f64
    }
}

impl TryFrom<f64> for FeeRate {
    type Error = TypesError;

    fn try_from(value: f64) -> Result<Self> {
        Self::from_fraction(value)
    }
}

impl From<FeeRate> for f64 {
    fn from(rate: FeeRate) -> f64 {
        rate.as_fraction()
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", f64::from(self.0) / 10_000.0)
    }
}
