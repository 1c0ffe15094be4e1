// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! User-space scale context

use super::ScaleLookup;
use crate::listener::{ListenerKey, ListenerList, UpdateListener};
use crate::{DerivedScaleType, Environment, Scale, ScaleType, ScaleTypes};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// A context holding the user and object scales
///
/// The pixel scale is `user × object`, recomputed on every change.
///
/// Contexts compare equal when their user and object scales are bitwise
/// equal (no epsilon; `0.0` and `-0.0` differ); overrides and listeners are
/// not compared.
pub struct UserScaleContext {
    env: Environment,
    usr: Cell<Scale>,
    obj: Cell<Scale>,
    pix: Cell<f64>,
    overridden: Cell<ScaleTypes>,
    listeners: RefCell<ListenerList>,
}

impl UserScaleContext {
    pub(super) fn with_scales(env: &Environment, usr: f64, obj: f64, device: f64) -> Self {
        UserScaleContext {
            env: env.clone(),
            usr: Cell::new(ScaleType::User.of(usr)),
            obj: Cell::new(ScaleType::Object.of(obj)),
            pix: Cell::new(usr * obj * device),
            overridden: Cell::new(ScaleTypes::empty()),
            listeners: Default::default(),
        }
    }

    /// Construct with all factors equal to `1`
    pub fn identity(env: &Environment) -> Self {
        Self::with_scales(env, 1.0, 1.0, 1.0)
    }

    /// Construct using the current user scale of `env`
    pub fn create(env: &Environment) -> Self {
        Self::with_scales(env, env.user_scale(), 1.0, 1.0)
    }

    /// Construct a copy of `other`
    ///
    /// Scale values and overrides are copied; listeners are not.
    pub fn create_from(other: &UserScaleContext) -> Self {
        let ctx = Self::with_scales(&other.env, other.usr().value(), other.obj().value(), 1.0);
        ctx.overridden.set(other.overridden());
        ctx
    }

    /// The environment this context reads global scales from
    #[inline]
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// The user scale
    #[inline]
    pub fn usr(&self) -> Scale {
        self.usr.get()
    }

    /// The object scale
    #[inline]
    pub fn obj(&self) -> Scale {
        self.obj.get()
    }

    /// The set of overridden scale types
    #[inline]
    pub fn overridden(&self) -> ScaleTypes {
        self.overridden.get()
    }

    /// True if `ty` has been overridden
    #[inline]
    pub fn is_overridden(&self, ty: ScaleType) -> bool {
        self.overridden().contains(ty.flag())
    }

    /// Store `scale` without recomputing or notifying
    ///
    /// Returns true if the stored value changed. System scales are not stored
    /// here and are ignored.
    pub(super) fn assign(&self, scale: Scale) -> bool {
        if self.is_overridden(scale.ty()) {
            return false;
        }
        let field = match scale.ty() {
            ScaleType::User => &self.usr,
            ScaleType::Object => &self.obj,
            ScaleType::System => return false,
        };
        if field.get() == scale {
            return false;
        }
        field.set(scale);
        true
    }

    pub(super) fn mark_overridden(&self, ty: ScaleType, overridden: bool) {
        let mut set = self.overridden();
        set.set(ty.flag(), overridden);
        self.overridden.set(set);
    }

    /// Recompute the pixel scale and notify if anything changed
    pub(super) fn on_updated(&self, changed: bool, device: f64) -> bool {
        let pix = self.usr().value() * self.obj().value() * device;
        let changed = changed || pix.to_bits() != self.pix.get().to_bits();
        self.pix.set(pix);
        if changed {
            log::trace!("scale context updated: {:?}", self);
            self.notify_update_listeners();
        }
        changed
    }

    /// Set a scale factor
    ///
    /// Does nothing if the factor's type is overridden. Otherwise, updates the
    /// factor and the pixel scale, notifies listeners if anything changed and
    /// returns true in that case.
    pub fn set_scale(&self, scale: Scale) -> bool {
        let changed = self.assign(scale);
        self.on_updated(changed, 1.0)
    }

    /// Set a scale factor and pin it against future updates
    ///
    /// Only another call to `override_scale` may change the factor thereafter.
    pub fn override_scale(&self, scale: Scale) -> bool {
        self.mark_overridden(scale.ty(), false);
        let changed = self.set_scale(scale);
        self.mark_overridden(scale.ty(), true);
        changed
    }

    /// Re-read the user scale from the environment
    pub fn update(&self) -> bool {
        self.set_scale(ScaleType::User.of(self.env.user_scale()))
    }

    /// Copy each non-overridden factor from `other`
    pub fn update_from(&self, other: &UserScaleContext) -> bool {
        let mut changed = self.assign(other.usr());
        changed |= self.assign(other.obj());
        self.on_updated(changed, 1.0)
    }

    /// Register a listener, held weakly
    pub fn add_update_listener(&self, listener: &Rc<dyn UpdateListener>) -> ListenerKey {
        self.listeners.borrow_mut().add(listener)
    }

    /// Unregister a listener
    pub fn remove_update_listener(&self, key: ListenerKey) -> bool {
        self.listeners.borrow_mut().remove(key)
    }

    /// Synchronously notify listeners in registration order
    pub fn notify_update_listeners(&self) {
        let live = self.listeners.borrow_mut().live();
        for listener in live {
            listener.updated();
        }
    }

    /// Detach all listeners
    pub fn dispose(&self) {
        self.listeners.borrow_mut().clear();
    }
}

impl ScaleLookup for UserScaleContext {
    fn get_scale(&self, ty: ScaleType) -> f64 {
        match ty {
            ScaleType::User => self.usr().value(),
            ScaleType::Object => self.obj().value(),
            ScaleType::System => 1.0,
        }
    }

    fn get_derived_scale(&self, ty: DerivedScaleType) -> f64 {
        match ty {
            DerivedScaleType::EffectiveUser => self.usr().value() * self.obj().value(),
            DerivedScaleType::Device => 1.0,
            DerivedScaleType::Pixel => self.pix.get(),
        }
    }
}

impl PartialEq for UserScaleContext {
    fn eq(&self, other: &Self) -> bool {
        self.usr().value().to_bits() == other.usr().value().to_bits()
            && self.obj().value().to_bits() == other.obj().value().to_bits()
    }
}

impl Eq for UserScaleContext {}

impl Hash for UserScaleContext {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.usr().value().to_bits().hash(state);
        self.obj().value().to_bits().hash(state);
    }
}

impl fmt::Debug for UserScaleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserScaleContext")
            .field("usr", &self.usr().value())
            .field("obj", &self.obj().value())
            .field("pix", &self.pix.get())
            .field("overridden", &self.overridden())
            .finish()
    }
}
