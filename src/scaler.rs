// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Alignment of stored geometry to the current scale

use crate::{DerivedScaleType, Environment, ScaleLookup};
use std::fmt;
use std::rc::Rc;

/// Scales the stored geometry of a single object
///
/// Geometry may be stored *nominal* (in unscaled units, awaiting scaling from
/// `1`) or *pre-scaled* (already expressed at some past scale). A `Scaler`
/// remembers which via its *initial scale* and computes the multiplier which
/// brings stored values to the current scale:
/// ```none
/// scale_val(v) = v × current_scale / initial_scale
/// ```
///
/// The current scale is supplied by a closure given at construction: usually
/// the environment's user scale ([`Scaler::for_user_scale`]) or a derived
/// scale of some context ([`Scaler::for_context`]).
///
/// Whether an object is pre-scaled must be stated explicitly: treating nominal
/// geometry as pre-scaled (or vice versa) is a classic source of sizing bugs.
///
/// Clones share the scale source but have independent initial scales.
#[derive(Clone)]
pub struct Scaler {
    initial: f64,
    pre_scaled: bool,
    current: Rc<dyn Fn() -> f64>,
}

impl Scaler {
    /// Construct for nominal geometry
    pub fn new(current: impl Fn() -> f64 + 'static) -> Self {
        Scaler {
            initial: 1.0,
            pre_scaled: false,
            current: Rc::new(current),
        }
    }

    /// Construct for geometry already expressed at the current scale
    pub fn pre_scaled(current: impl Fn() -> f64 + 'static) -> Self {
        let mut scaler = Scaler::new(current);
        scaler.set_pre_scaled(true);
        scaler
    }

    /// Construct for nominal geometry tracking the user scale of `env`
    pub fn for_user_scale(env: &Environment) -> Self {
        let env = env.clone();
        Scaler::new(move || env.user_scale())
    }

    /// Construct for nominal geometry tracking a derived scale of `ctx`
    pub fn for_context<C: ScaleLookup + 'static>(ctx: Rc<C>, ty: DerivedScaleType) -> Self {
        Scaler::new(move || ctx.get_derived_scale(ty))
    }

    /// The current scale
    #[inline]
    pub fn current_scale(&self) -> f64 {
        (self.current)()
    }

    /// The scale already applied to stored geometry (`1` if nominal)
    #[inline]
    pub fn initial_scale(&self) -> f64 {
        self.initial
    }

    /// True if stored geometry is considered pre-scaled
    ///
    /// This holds even when the scale at the time was `1`.
    #[inline]
    pub fn is_pre_scaled(&self) -> bool {
        self.pre_scaled
    }

    /// Mark stored geometry as pre-scaled (at the current scale) or nominal
    pub fn set_pre_scaled(&mut self, pre_scaled: bool) {
        self.pre_scaled = pre_scaled;
        self.initial = if pre_scaled {
            self.current_scale()
        } else {
            1.0
        };
    }

    /// The multiplier from stored values to the current scale
    pub fn aligned_scale(&self) -> f64 {
        debug_assert!(self.initial != 0.0, "Scaler: zero initial scale");
        self.current_scale() / self.initial
    }

    /// Scale a stored value
    #[inline]
    pub fn scale_val(&self, value: f64) -> f64 {
        value * self.aligned_scale()
    }

    /// Adopt the initial scale and pre-scaled state of `other`
    ///
    /// Returns true if the initial scale changed.
    pub fn update(&mut self, other: &Scaler) -> bool {
        let changed = self.initial.to_bits() != other.initial.to_bits();
        self.initial = other.initial;
        self.pre_scaled = other.pre_scaled;
        changed
    }
}

impl fmt::Debug for Scaler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scaler")
            .field("initial", &self.initial)
            .field("pre_scaled", &self.pre_scaled)
            .field("current", &self.current_scale())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn shared(v: f64) -> (Rc<Cell<f64>>, Scaler) {
        let scale = Rc::new(Cell::new(v));
        let s = scale.clone();
        (scale, Scaler::new(move || s.get()))
    }

    #[test]
    fn nominal() {
        let (scale, scaler) = shared(2.0);
        assert!(!scaler.is_pre_scaled());
        assert_eq!(scaler.scale_val(10.0), 20.0);
        scale.set(3.0);
        assert_eq!(scaler.scale_val(10.0), 30.0);
    }

    #[test]
    fn identity_when_aligned() {
        let (_, mut scaler) = shared(1.75);
        scaler.set_pre_scaled(true);
        for x in [0.0, 1.0, -3.5, 1e9, 123.456] {
            assert_eq!(scaler.scale_val(x), x);
        }
    }

    #[test]
    fn pre_scale_correction() {
        let (scale, mut scaler) = shared(2.0);
        scaler.set_pre_scaled(true);
        assert_eq!(scaler.initial_scale(), 2.0);
        scale.set(3.0);
        assert_eq!(scaler.scale_val(10.0), 15.0);

        scaler.set_pre_scaled(false);
        assert_eq!(scaler.scale_val(10.0), 30.0);
    }

    #[test]
    fn pre_scaled_at_unit_scale() {
        let (scale, mut scaler) = shared(1.0);
        scaler.set_pre_scaled(true);
        assert!(scaler.is_pre_scaled());
        assert_eq!(scaler.initial_scale(), 1.0);
        scale.set(2.0);
        assert_eq!(scaler.scale_val(5.0), 10.0);

        let (_, mut other) = shared(1.0);
        assert!(!other.update(&scaler));
        assert!(other.is_pre_scaled());

        scaler.set_pre_scaled(false);
        assert!(!scaler.is_pre_scaled());
    }

    #[test]
    fn update_from_other() {
        let (scale, mut a) = shared(1.0);
        let (_, mut b) = shared(2.0);
        b.set_pre_scaled(true);
        assert!(a.update(&b));
        assert!(!a.update(&b));
        assert_eq!(a.initial_scale(), 2.0);
        scale.set(4.0);
        assert_eq!(a.scale_val(1.0), 2.0);
    }

    #[test]
    fn user_scale() {
        let env = Environment::new();
        let scaler = Scaler::for_user_scale(&env);
        env.set_user_scale(1.5);
        assert_eq!(scaler.scale_val(100.0), 150.0);
    }

    #[test]
    fn nan_propagates() {
        let (_, scaler) = shared(2.0);
        assert!(scaler.scale_val(f64::NAN).is_nan());
    }
}
