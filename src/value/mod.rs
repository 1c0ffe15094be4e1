// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Self-rescaling measurements
//!
//! Each type here holds a measurement in unscaled units and yields the value
//! at the current scale when read:
//!
//! -   [`ScaledValue`] recomputes on every read
//! -   [`ScaledValueGroup`] recomputes all members eagerly when the user scale
//!     changes; reads then return the cached value
//! -   [`ScaledSize`] and [`ScaledInsets`] use a [`crate::Scaler`] and refresh
//!     their cached pixel values when read
//!
//! Rounding to whole pixels always happens last, after the full scale has been
//! applied.

use crate::conv::RoundingMode;
use crate::Environment;
use std::fmt;
use std::rc::Rc;

mod group;
mod insets;
mod size;

pub use group::{GroupedValue, ScaledValueGroup};
pub use insets::ScaledInsets;
pub use size::ScaledSize;

/// Source of an unscaled value
#[derive(Clone)]
pub enum UnscaledValue {
    /// A fixed value
    Fixed(f64),
    /// A value resolved on every read
    ///
    /// This supports values which may be replaced at run-time (e.g. by a theme
    /// change). `default` is used when `lookup` yields `None`.
    Provider {
        lookup: Rc<dyn Fn() -> Option<f64>>,
        default: f64,
    },
}

impl UnscaledValue {
    /// Construct a provider
    pub fn provider(lookup: impl Fn() -> Option<f64> + 'static, default: f64) -> Self {
        UnscaledValue::Provider {
            lookup: Rc::new(lookup),
            default,
        }
    }

    /// Resolve the current value
    pub fn resolve(&self) -> f64 {
        match self {
            UnscaledValue::Fixed(value) => *value,
            UnscaledValue::Provider { lookup, default } => lookup().unwrap_or(*default),
        }
    }
}

impl From<f64> for UnscaledValue {
    fn from(value: f64) -> Self {
        UnscaledValue::Fixed(value)
    }
}

impl From<i32> for UnscaledValue {
    fn from(value: i32) -> Self {
        UnscaledValue::Fixed(value.into())
    }
}

impl fmt::Debug for UnscaledValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnscaledValue::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            UnscaledValue::Provider { default, .. } => f
                .debug_struct("Provider")
                .field("default", default)
                .finish_non_exhaustive(),
        }
    }
}

/// A scalar measurement scaled by the user scale on every read
#[derive(Clone, Debug)]
pub struct ScaledValue {
    env: Environment,
    unscaled: UnscaledValue,
}

impl ScaledValue {
    /// Construct
    pub fn new(env: &Environment, unscaled: impl Into<UnscaledValue>) -> Self {
        ScaledValue {
            env: env.clone(),
            unscaled: unscaled.into(),
        }
    }

    /// The unscaled value
    #[inline]
    pub fn unscaled(&self) -> f64 {
        self.unscaled.resolve()
    }

    /// The scaled value, without rounding
    #[inline]
    pub fn get_float(&self) -> f64 {
        self.env.scale(self.unscaled())
    }

    /// The scaled value, rounded to the nearest integer
    #[inline]
    pub fn get(&self) -> i64 {
        self.get_rounded(RoundingMode::Round)
    }

    /// The scaled value, rounded with the given `mode`
    #[inline]
    pub fn get_rounded(&self, mode: RoundingMode) -> i64 {
        mode.round(self.get_float())
    }
}

impl fmt::Display for ScaledValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn rounds_half_away_from_zero() {
        let env = Environment::new();
        env.set_user_scale(1.25);
        assert_eq!(ScaledValue::new(&env, 8).get(), 10);
        assert_eq!(ScaledValue::new(&env, 7).get(), 9);
        assert_eq!(ScaledValue::new(&env, 7).get_float(), 8.75);
        assert_eq!(ScaledValue::new(&env, -2).get(), -3);
    }

    #[test]
    fn live() {
        let env = Environment::new();
        let value = ScaledValue::new(&env, 4.0);
        assert_eq!(value.get(), 4);
        env.set_user_scale(2.0);
        assert_eq!(value.get(), 8);
        assert_eq!(value.to_string(), "8");
    }

    #[test]
    fn provider() {
        let env = Environment::new();
        env.set_user_scale(2.0);
        let theme = Rc::new(Cell::new(None));
        let t = theme.clone();
        let value = ScaledValue::new(&env, UnscaledValue::provider(move || t.get(), 5.0));
        assert_eq!(value.unscaled(), 5.0);
        assert_eq!(value.get(), 10);
        theme.set(Some(3.0));
        assert_eq!(value.get(), 6);
    }

    #[test]
    fn modes() {
        let env = Environment::new();
        env.set_user_scale(1.5);
        let value = ScaledValue::new(&env, 3);
        assert_eq!(value.get_rounded(RoundingMode::Floor), 4);
        assert_eq!(value.get_rounded(RoundingMode::Ceil), 5);
    }

    #[test]
    fn nan_is_not_checked() {
        let env = Environment::new();
        let value = ScaledValue::new(&env, f64::NAN);
        assert!(value.get_float().is_nan());
        assert_eq!(value.get(), 0);
    }
}
