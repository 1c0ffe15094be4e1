// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Type conversion utilities
//!
//! All measurements are computed in `f64` and only converted to integral
//! pixels as the final step, after the full pixel scale has been applied.
//! Rounding earlier (e.g. after each individual scale factor) accumulates
//! error; this module is the single place where the conversion happens.

use easy_cast::CastFloat;

/// Rounding applied when converting a scaled value to whole pixels
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoundingMode {
    /// Round towards negative infinity
    Floor,
    /// Round towards positive infinity
    Ceil,
    /// Round to the nearest integer, ties away from zero
    #[default]
    Round,
}

impl RoundingMode {
    /// Round `x` to an integer
    ///
    /// Values which cannot be represented (NaN, infinities, out of range) are
    /// not treated as errors: the result saturates and NaN maps to `0`.
    pub fn round(self, x: f64) -> i64 {
        let result: Result<i64, _> = match self {
            RoundingMode::Floor => x.try_cast_floor(),
            RoundingMode::Ceil => x.try_cast_ceil(),
            RoundingMode::Round => x.try_cast_nearest(),
        };
        result.unwrap_or_else(|_| self.round_saturating(x))
    }

    /// Apply rounding to a float without converting
    #[inline]
    pub fn round_f64(self, x: f64) -> f64 {
        match self {
            RoundingMode::Floor => x.floor(),
            RoundingMode::Ceil => x.ceil(),
            RoundingMode::Round => x.round(),
        }
    }

    fn round_saturating(self, x: f64) -> i64 {
        self.round_f64(x) as i64
    }
}

/// Round to the nearest integer, ties away from zero
///
/// This is the default rounding rule for all scaled measurements.
#[inline]
pub fn round(x: f64) -> i64 {
    RoundingMode::Round.round(x)
}
