// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Self-rescaling insets

use crate::conv::round;
use crate::geom::{Insets, InsetsF, Size};
use crate::{Environment, Scaler};
use std::cell::Cell;

/// Edge insets which follow the current scale
///
/// Like [`super::ScaledSize`], insets are stored unscaled along with a
/// [`Scaler`] and refreshed when read.
#[derive(Clone, Debug)]
pub struct ScaledInsets {
    unscaled: InsetsF,
    scaled: Cell<Insets>,
    scaler: Scaler,
}

impl ScaledInsets {
    /// Construct from nominal insets, tracking the user scale of `env`
    pub fn new(env: &Environment, top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self::with_scaler(
            InsetsF::new(top, left, bottom, right),
            Scaler::for_user_scale(env),
        )
    }

    /// Construct with the same nominal inset on every side
    pub fn uniform(env: &Environment, inset: f64) -> Self {
        Self::with_scaler(InsetsF::uniform(inset), Scaler::for_user_scale(env))
    }

    /// Construct with a given scaler
    pub fn with_scaler(unscaled: InsetsF, scaler: Scaler) -> Self {
        let insets = ScaledInsets {
            unscaled,
            scaled: Cell::new(Insets::default()),
            scaler,
        };
        insets.update();
        insets
    }

    /// Recompute the scaled insets
    ///
    /// Returns true if any pixel value changed.
    pub fn update(&self) -> bool {
        let s = |v: f64| round(self.scaler.scale_val(v));
        let u = self.unscaled;
        let insets = Insets::new(s(u.top), s(u.left), s(u.bottom), s(u.right));
        self.scaled.replace(insets) != insets
    }

    /// The scaler
    #[inline]
    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    /// Mark the stored insets as pre-scaled (at the current scale) or nominal
    pub fn set_pre_scaled(&mut self, pre_scaled: bool) {
        self.scaler.set_pre_scaled(pre_scaled);
        self.update();
    }

    /// The stored insets
    #[inline]
    pub fn unscaled(&self) -> InsetsF {
        self.unscaled
    }

    /// The scaled insets in pixels
    pub fn insets(&self) -> Insets {
        self.update();
        self.scaled.get()
    }

    /// Scaled top inset
    #[inline]
    pub fn top(&self) -> i64 {
        self.insets().top
    }

    /// Scaled left inset
    #[inline]
    pub fn left(&self) -> i64 {
        self.insets().left
    }

    /// Scaled bottom inset
    #[inline]
    pub fn bottom(&self) -> i64 {
        self.insets().bottom
    }

    /// Scaled right inset
    #[inline]
    pub fn right(&self) -> i64 {
        self.insets().right
    }

    /// Scaled `left + right`
    #[inline]
    pub fn width(&self) -> i64 {
        self.insets().width()
    }

    /// Scaled `top + bottom`
    #[inline]
    pub fn height(&self) -> i64 {
        self.insets().height()
    }

    /// Grow `size` by the scaled insets
    ///
    /// Arithmetic saturates at the bounds of `i64`.
    pub fn add_to(&self, size: Size) -> Size {
        let insets = self.insets();
        Size::new(
            size.width.saturating_add(insets.width()),
            size.height.saturating_add(insets.height()),
        )
    }

    /// Shrink `size` by the scaled insets
    ///
    /// The result is not clamped at zero and may be negative. Arithmetic
    /// saturates at the bounds of `i64`.
    pub fn remove_from(&self, size: Size) -> Size {
        let insets = self.insets();
        Size::new(
            size.width.saturating_sub(insets.width()),
            size.height.saturating_sub(insets.height()),
        )
    }
}
