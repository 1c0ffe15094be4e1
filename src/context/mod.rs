// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Scale contexts
//!
//! A context captures a snapshot of the active scale factors:
//!
//! -   [`UserScaleContext`] holds the user and object scales
//! -   [`ScaleContext`] additionally holds the system scale and may be bound to
//!     a live [`ScaleSurface`]
//!
//! The pixel scale of a context is computed whenever a factor changes and
//! stored, thus reads are cheap. A factor may be *overridden*, pinning it
//! against future updates.
//!
//! Contexts use interior mutability: all methods take `&self`, and contexts
//! may be shared via `Rc`. Update listeners are notified synchronously after a
//! change and may read (but should not mutate) the context.

use crate::conv::RoundingMode;
use crate::geom::{Size, SizeF};
use crate::{DerivedScaleType, ScaleType};

mod system;
mod user;

pub use system::{ScaleContext, ScaleSurface};
pub use user::UserScaleContext;

/// Read access to the scale factors of a context
pub trait ScaleLookup {
    /// Get the value of an independent factor
    fn get_scale(&self, ty: ScaleType) -> f64;

    /// Get the value of a derived factor
    fn get_derived_scale(&self, ty: DerivedScaleType) -> f64;

    /// Scale `value` by the derived factor `ty`
    #[inline]
    fn apply(&self, value: f64, ty: DerivedScaleType) -> f64 {
        value * self.get_derived_scale(ty)
    }

    /// Scale `value` by the derived factor `ty`, then round
    #[inline]
    fn apply_rounded(&self, value: f64, ty: DerivedScaleType, mode: RoundingMode) -> i64 {
        mode.round(self.apply(value, ty))
    }

    /// Scale `size` by the derived factor `ty`, then round to the nearest pixel
    fn apply_size(&self, size: SizeF, ty: DerivedScaleType) -> Size {
        size.scaled(self.get_derived_scale(ty)).rounded()
    }

    /// True if the pixel scale exceeds `1`
    fn is_hidpi(&self) -> bool {
        self.get_derived_scale(DerivedScaleType::Pixel) > 1.0
    }
}

impl<C: ScaleLookup + ?Sized> ScaleLookup for std::rc::Rc<C> {
    #[inline]
    fn get_scale(&self, ty: ScaleType) -> f64 {
        (**self).get_scale(ty)
    }

    #[inline]
    fn get_derived_scale(&self, ty: DerivedScaleType) -> f64 {
        (**self).get_derived_scale(ty)
    }
}
