// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! KAS scale library — simple geometry types

use crate::conv::round;

/// A size in whole pixels
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: i64,
    pub height: i64,
}

impl Size {
    /// Construct
    #[inline]
    pub const fn new(width: i64, height: i64) -> Self {
        Size { width, height }
    }
}

/// A size in fractional units
///
/// Usually this represents an unscaled size.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeF {
    pub width: f64,
    pub height: f64,
}

impl SizeF {
    /// Construct
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        SizeF { width, height }
    }

    /// Multiply both components by `scale`
    #[inline]
    pub fn scaled(self, scale: f64) -> Self {
        SizeF::new(self.width * scale, self.height * scale)
    }

    /// Round to the nearest whole pixels
    #[inline]
    pub fn rounded(self) -> Size {
        Size::new(round(self.width), round(self.height))
    }
}

impl From<(f64, f64)> for SizeF {
    fn from((width, height): (f64, f64)) -> Self {
        SizeF::new(width, height)
    }
}

/// Edge insets in whole pixels
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Insets {
    pub top: i64,
    pub left: i64,
    pub bottom: i64,
    pub right: i64,
}

impl Insets {
    /// Construct
    #[inline]
    pub const fn new(top: i64, left: i64, bottom: i64, right: i64) -> Self {
        Insets {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Sum of the left and right insets (saturating)
    #[inline]
    pub fn width(&self) -> i64 {
        self.left.saturating_add(self.right)
    }

    /// Sum of the top and bottom insets (saturating)
    #[inline]
    pub fn height(&self) -> i64 {
        self.top.saturating_add(self.bottom)
    }
}

/// Edge insets in fractional units
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InsetsF {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl InsetsF {
    /// Construct
    #[inline]
    pub const fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        InsetsF {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Construct with the same inset on every side
    #[inline]
    pub const fn uniform(inset: f64) -> Self {
        InsetsF::new(inset, inset, inset, inset)
    }
}
