// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Self-rescaling size

use crate::geom::{Size, SizeF};
use crate::{Environment, Scaler};
use std::cell::Cell;

/// A two-dimensional size which follows the current scale
///
/// The size is stored unscaled along with a [`Scaler`]. Reads refresh the
/// cached pixel size from the scaler's current multiplier.
#[derive(Clone, Debug)]
pub struct ScaledSize {
    unscaled: SizeF,
    scaled: Cell<Size>,
    scaler: Scaler,
}

impl ScaledSize {
    /// Construct from a nominal size, tracking the user scale of `env`
    pub fn new(env: &Environment, width: f64, height: f64) -> Self {
        Self::with_scaler(SizeF::new(width, height), Scaler::for_user_scale(env))
    }

    /// Construct from a size already expressed at the current user scale
    pub fn pre_scaled(env: &Environment, width: f64, height: f64) -> Self {
        let mut scaler = Scaler::for_user_scale(env);
        scaler.set_pre_scaled(true);
        Self::with_scaler(SizeF::new(width, height), scaler)
    }

    /// Construct with a given scaler
    pub fn with_scaler(unscaled: SizeF, scaler: Scaler) -> Self {
        let size = ScaledSize {
            unscaled,
            scaled: Cell::new(Size::default()),
            scaler,
        };
        size.update();
        size
    }

    /// Copy with a different unscaled width
    pub fn with_width(&self, width: f64) -> Self {
        Self::with_scaler(SizeF::new(width, self.unscaled.height), self.scaler.clone())
    }

    /// Copy with a different unscaled height
    pub fn with_height(&self, height: f64) -> Self {
        Self::with_scaler(SizeF::new(self.unscaled.width, height), self.scaler.clone())
    }

    /// Recompute the scaled size
    ///
    /// Returns true if the pixel size changed.
    pub fn update(&self) -> bool {
        let size = self.size_f().rounded();
        self.scaled.replace(size) != size
    }

    /// The scaler
    #[inline]
    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    /// Mark the stored size as pre-scaled (at the current scale) or nominal
    pub fn set_pre_scaled(&mut self, pre_scaled: bool) {
        self.scaler.set_pre_scaled(pre_scaled);
        self.update();
    }

    /// Adopt the initial scale of `other`
    ///
    /// Returns true if the pixel size changed.
    pub fn update_from_scaler(&mut self, other: &Scaler) -> bool {
        self.scaler.update(other);
        self.update()
    }

    /// The stored size
    #[inline]
    pub fn unscaled(&self) -> SizeF {
        self.unscaled
    }

    /// The scaled size, without rounding
    pub fn size_f(&self) -> SizeF {
        SizeF::new(
            self.scaler.scale_val(self.unscaled.width),
            self.scaler.scale_val(self.unscaled.height),
        )
    }

    /// The scaled size in pixels
    pub fn size(&self) -> Size {
        self.update();
        self.scaled.get()
    }

    /// The scaled width in pixels
    #[inline]
    pub fn width(&self) -> i64 {
        self.size().width
    }

    /// The scaled height in pixels
    #[inline]
    pub fn height(&self) -> i64 {
        self.size().height
    }
}
