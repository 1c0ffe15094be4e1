// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Scale factors and their types
//!
//! Three factors are independent: the *user* scale (zoom chosen in settings),
//! the *system* scale (pixel density of a display) and the *object* scale (a
//! per-instance multiplier). All other factors are derived from these; see
//! [`DerivedScaleType`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An independent scale factor
#[derive(Copy, Clone, Debug, PartialEq, Eq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScaleType {
    /// The user zoom factor, shared by the whole UI
    User,
    /// The pixel density factor of a display surface
    System,
    /// A per-object multiplier
    Object,
}

/// A scale factor computed from the independent [`ScaleType`]s
///
/// These are never stored in a [`Scale`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DerivedScaleType {
    /// `user × object`
    EffectiveUser,
    /// The system scale when the device applies it, otherwise `1`
    ///
    /// See [`crate::HiDpiMode`].
    Device,
    /// `user × object × device`: the factor producing device pixels
    Pixel,
}

bitflags::bitflags! {
    /// A set of [`ScaleType`]s
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct ScaleTypes: u8 {
        const USER = 1 << 0;
        const SYSTEM = 1 << 1;
        const OBJECT = 1 << 2;
    }
}

impl ScaleType {
    /// All types, in declaration order
    pub const ALL: [ScaleType; 3] = [ScaleType::User, ScaleType::System, ScaleType::Object];

    /// Get the interned [`Scale`] of this type with the given `value`
    ///
    /// Repeated calls with equal arguments return the same instance, thus
    /// [`Scale::ptr_eq`] may be used as a fast equality check.
    ///
    /// The value is not validated.
    pub fn of(self, value: f64) -> Scale {
        CACHE.with(|cache| {
            let mut cache = cache.borrow_mut();
            let entry = cache
                .entry((self, value.to_bits()))
                .or_insert_with(|| &*Box::leak(Box::new(ScaleData { value, ty: self })));
            Scale(*entry)
        })
    }

    /// The flag representing this type within [`ScaleTypes`]
    #[inline]
    pub fn flag(self) -> ScaleTypes {
        match self {
            ScaleType::User => ScaleTypes::USER,
            ScaleType::System => ScaleTypes::SYSTEM,
            ScaleType::Object => ScaleTypes::OBJECT,
        }
    }

    /// Short name, as accepted by [`FromStr`]
    pub fn name(self) -> &'static str {
        match self {
            ScaleType::User => "usr",
            ScaleType::System => "sys",
            ScaleType::Object => "obj",
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognised [`ScaleType`] name
#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown scale type '{0}' (expected one of: usr, sys, obj)")]
pub struct ParseScaleTypeError(pub String);

impl FromStr for ScaleType {
    type Err = ParseScaleTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "usr" => Ok(ScaleType::User),
            "sys" => Ok(ScaleType::System),
            "obj" => Ok(ScaleType::Object),
            _ => Err(ParseScaleTypeError(s.to_string())),
        }
    }
}

#[derive(Debug)]
struct ScaleData {
    value: f64,
    ty: ScaleType,
}

// Entries are leaked: the set of distinct factors in use is small and each
// lives until program exit.
thread_local! {
    static CACHE: RefCell<HashMap<(ScaleType, u64), &'static ScaleData>> =
        RefCell::new(HashMap::new());
}

/// An immutable, interned `(value, type)` pair
///
/// Construct via [`ScaleType::of`].
#[derive(Copy, Clone)]
pub struct Scale(&'static ScaleData);

impl Scale {
    /// The scale factor
    #[inline]
    pub fn value(self) -> f64 {
        self.0.value
    }

    /// The type of factor
    #[inline]
    pub fn ty(self) -> ScaleType {
        self.0.ty
    }

    /// True if `self` and `other` are the same interned instance
    #[inline]
    pub fn ptr_eq(self, other: Scale) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl PartialEq for Scale {
    fn eq(&self, other: &Self) -> bool {
        // Instances interned on another thread are distinct objects
        self.ptr_eq(*other)
            || (self.ty() == other.ty() && self.value().to_bits() == other.value().to_bits())
    }
}

impl fmt::Debug for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scale({:?}, {})", self.ty(), self.value())
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", self.ty(), self.value())
    }
}
