// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Device-aware scale context

use super::{ScaleLookup, UserScaleContext};
use crate::listener::{ListenerKey, UpdateListener};
use crate::{DerivedScaleType, Environment, Scale, ScaleType, ScaleTypes};
use std::cell::Cell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

/// A display surface with a (possibly changing) system scale
///
/// For example, a window which may be moved between monitors.
pub trait ScaleSurface {
    /// The current system scale of the surface
    fn system_scale(&self) -> f64;
}

/// A context holding the user, object and system scales
///
/// The pixel scale is `user × object × device`, where the device factor is
/// given by [`Environment::device_scale`]. The device factor is sampled
/// together with the pixel scale, so a change to the environment's
/// [`HiDpiMode`](crate::HiDpiMode) takes effect on the next mutation or
/// [`ScaleContext::update`].
///
/// A context may be bound to a [`ScaleSurface`], in which case
/// [`ScaleContext::update`] re-samples its system scale. The surface is
/// referenced weakly; once dropped the last known system scale is kept.
pub struct ScaleContext {
    user: UserScaleContext,
    sys: Cell<Scale>,
    dev: Cell<f64>,
    surface: Option<Weak<dyn ScaleSurface>>,
}

impl ScaleContext {
    fn with_sys(user: UserScaleContext, sys: f64, surface: Option<Weak<dyn ScaleSurface>>) -> Self {
        let ctx = ScaleContext {
            user,
            sys: Cell::new(ScaleType::System.of(sys)),
            dev: Cell::new(1.0),
            surface,
        };
        // No listeners yet: this only initialises the pixel scale
        ctx.on_updated(false);
        ctx
    }

    /// Construct with all factors equal to `1`
    pub fn identity(env: &Environment) -> Self {
        Self::with_sys(UserScaleContext::identity(env), 1.0, None)
    }

    /// Construct using the current user and default system scales of `env`
    pub fn create(env: &Environment) -> Self {
        Self::with_sys(UserScaleContext::create(env), env.system_scale(), None)
    }

    /// Construct bound to a display surface
    ///
    /// The system scale is sampled from `surface` now and on each
    /// [`Self::update`] for as long as the surface exists.
    pub fn create_for_surface<S: ScaleSurface + 'static>(env: &Environment, surface: &Rc<S>) -> Self {
        let weak = Rc::downgrade(surface);
        let weak: Weak<dyn ScaleSurface> = weak;
        Self::with_sys(
            UserScaleContext::create(env),
            surface.system_scale(),
            Some(weak),
        )
    }

    /// Construct a copy of `other`
    ///
    /// Scale values, overrides and the surface binding are copied; listeners
    /// are not.
    pub fn create_from(other: &ScaleContext) -> Self {
        Self::with_sys(
            UserScaleContext::create_from(&other.user),
            other.sys().value(),
            other.surface.clone(),
        )
    }

    /// Construct from a user context, using the default system scale
    pub fn from_user_context(user: &UserScaleContext) -> Self {
        let env = user.environment();
        Self::with_sys(
            UserScaleContext::create_from(user),
            env.system_scale(),
            None,
        )
    }

    /// The environment this context reads global scales from
    #[inline]
    pub fn environment(&self) -> &Environment {
        self.user.environment()
    }

    /// The user scale
    #[inline]
    pub fn usr(&self) -> Scale {
        self.user.usr()
    }

    /// The object scale
    #[inline]
    pub fn obj(&self) -> Scale {
        self.user.obj()
    }

    /// The system scale
    #[inline]
    pub fn sys(&self) -> Scale {
        self.sys.get()
    }

    /// The set of overridden scale types
    #[inline]
    pub fn overridden(&self) -> ScaleTypes {
        self.user.overridden()
    }

    /// True if `ty` has been overridden
    #[inline]
    pub fn is_overridden(&self, ty: ScaleType) -> bool {
        self.user.is_overridden(ty)
    }

    /// True if bound to a surface which still exists
    pub fn has_surface(&self) -> bool {
        self.live_surface().is_some()
    }

    fn live_surface(&self) -> Option<Rc<dyn ScaleSurface>> {
        self.surface.as_ref().and_then(Weak::upgrade)
    }

    fn sample_device(&self) -> f64 {
        let dev = self.environment().device_scale(self.sys().value());
        self.dev.set(dev);
        dev
    }

    fn assign(&self, scale: Scale) -> bool {
        if scale.ty() != ScaleType::System {
            return self.user.assign(scale);
        }
        if self.is_overridden(ScaleType::System) || self.sys.get() == scale {
            return false;
        }
        self.sys.set(scale);
        true
    }

    fn on_updated(&self, changed: bool) -> bool {
        let dev = self.sample_device();
        self.user.on_updated(changed, dev)
    }

    /// Set a scale factor
    ///
    /// See [`UserScaleContext::set_scale`].
    pub fn set_scale(&self, scale: Scale) -> bool {
        let changed = self.assign(scale);
        self.on_updated(changed)
    }

    /// Set a scale factor and pin it against future updates
    pub fn override_scale(&self, scale: Scale) -> bool {
        self.user.mark_overridden(scale.ty(), false);
        let changed = self.set_scale(scale);
        self.user.mark_overridden(scale.ty(), true);
        changed
    }

    /// Re-read the user scale and, if bound, the surface's system scale
    ///
    /// The pixel scale is always recomputed, thus this also picks up a change
    /// to the environment's [`HiDpiMode`](crate::HiDpiMode).
    pub fn update(&self) -> bool {
        let env = self.environment();
        let mut changed = self.assign(ScaleType::User.of(env.user_scale()));
        if let Some(surface) = self.live_surface() {
            changed |= self.assign(ScaleType::System.of(surface.system_scale()));
        }
        self.on_updated(changed)
    }

    /// Copy each non-overridden factor from `other`
    pub fn update_from(&self, other: &ScaleContext) -> bool {
        let mut changed = self.assign(other.usr());
        changed |= self.assign(other.obj());
        changed |= self.assign(other.sys());
        self.on_updated(changed)
    }

    /// Copy the non-overridden user and object scales from `other`
    pub fn update_from_user(&self, other: &UserScaleContext) -> bool {
        let mut changed = self.assign(other.usr());
        changed |= self.assign(other.obj());
        self.on_updated(changed)
    }

    /// Register a listener, held weakly
    #[inline]
    pub fn add_update_listener(&self, listener: &Rc<dyn UpdateListener>) -> ListenerKey {
        self.user.add_update_listener(listener)
    }

    /// Unregister a listener
    #[inline]
    pub fn remove_update_listener(&self, key: ListenerKey) -> bool {
        self.user.remove_update_listener(key)
    }

    /// Synchronously notify listeners in registration order
    #[inline]
    pub fn notify_update_listeners(&self) {
        self.user.notify_update_listeners()
    }

    /// Detach all listeners
    #[inline]
    pub fn dispose(&self) {
        self.user.dispose()
    }
}

impl ScaleLookup for ScaleContext {
    fn get_scale(&self, ty: ScaleType) -> f64 {
        match ty {
            ScaleType::System => self.sys().value(),
            ty => self.user.get_scale(ty),
        }
    }

    fn get_derived_scale(&self, ty: DerivedScaleType) -> f64 {
        match ty {
            DerivedScaleType::Device => self.dev.get(),
            ty => self.user.get_derived_scale(ty),
        }
    }
}

impl PartialEq for ScaleContext {
    fn eq(&self, other: &Self) -> bool {
        self.user == other.user && self.sys().value().to_bits() == other.sys().value().to_bits()
    }
}

impl Eq for ScaleContext {}

impl Hash for ScaleContext {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.user.hash(state);
        self.sys().value().to_bits().hash(state);
    }
}

impl fmt::Debug for ScaleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScaleContext")
            .field("user", &self.user)
            .field("sys", &self.sys().value())
            .field("dev", &self.dev.get())
            .field("bound", &self.surface.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HiDpiMode;

    struct Monitor(Cell<f64>);

    impl ScaleSurface for Monitor {
        fn system_scale(&self) -> f64 {
            self.0.get()
        }
    }

    fn pix(ctx: &ScaleContext) -> f64 {
        ctx.get_derived_scale(DerivedScaleType::Pixel)
    }

    #[test]
    fn device_factor_depends_on_mode() {
        let env = Environment::new();
        env.set_system_scale(2.0);
        env.set_user_scale(1.5);
        let ctx = ScaleContext::create(&env);
        assert_eq!(ctx.sys().value(), 2.0);
        assert_eq!(ctx.get_derived_scale(DerivedScaleType::Device), 1.0);
        assert_eq!(pix(&ctx), 1.5);

        env.set_hidpi_mode(HiDpiMode::DeviceScale);
        assert!(ctx.update());
        assert_eq!(ctx.get_derived_scale(DerivedScaleType::Device), 2.0);
        assert_eq!(pix(&ctx), 3.0);
    }

    #[test]
    fn device_factor_consistent_with_pixel_scale() {
        let env = Environment::new();
        env.set_system_scale(2.0);
        let ctx = ScaleContext::create(&env);
        let consistent = |ctx: &ScaleContext| {
            ctx.usr().value() * ctx.obj().value() * ctx.get_derived_scale(DerivedScaleType::Device)
                == pix(ctx)
        };
        assert!(consistent(&ctx));

        env.set_hidpi_mode(HiDpiMode::DeviceScale);
        assert_eq!(ctx.get_derived_scale(DerivedScaleType::Device), 1.0);
        assert!(consistent(&ctx));

        ctx.set_scale(ScaleType::Object.of(1.5));
        assert_eq!(ctx.get_derived_scale(DerivedScaleType::Device), 2.0);
        assert_eq!(pix(&ctx), 3.0);
        assert!(consistent(&ctx));

        env.set_hidpi_mode(HiDpiMode::Emulated);
        assert!(consistent(&ctx));
        assert!(ctx.update());
        assert_eq!(ctx.get_derived_scale(DerivedScaleType::Device), 1.0);
        assert!(consistent(&ctx));
    }

    #[test]
    fn surface_resampled() {
        let env = Environment::new();
        env.set_hidpi_mode(HiDpiMode::DeviceScale);
        let monitor = Rc::new(Monitor(Cell::new(1.0)));
        let ctx = ScaleContext::create_for_surface(&env, &monitor);
        assert!(ctx.has_surface());
        assert_eq!(pix(&ctx), 1.0);

        monitor.0.set(2.0);
        assert!(ctx.update());
        assert_eq!(ctx.sys().value(), 2.0);
        assert_eq!(pix(&ctx), 2.0);
    }

    #[test]
    fn dropped_surface_keeps_last_value() {
        let env = Environment::new();
        let monitor = Rc::new(Monitor(Cell::new(2.0)));
        let ctx = ScaleContext::create_for_surface(&env, &monitor);
        drop(monitor);
        assert!(!ctx.has_surface());
        assert!(!ctx.update());
        assert_eq!(ctx.sys().value(), 2.0);
    }

    #[test]
    fn system_override() {
        let env = Environment::new();
        env.set_hidpi_mode(HiDpiMode::DeviceScale);
        let monitor = Rc::new(Monitor(Cell::new(2.0)));
        let ctx = ScaleContext::create_for_surface(&env, &monitor);
        ctx.override_scale(ScaleType::System.of(1.0));
        monitor.0.set(3.0);
        ctx.update();
        assert_eq!(ctx.sys().value(), 1.0);
        assert_eq!(pix(&ctx), 1.0);
    }

    #[test]
    fn copy_and_update_from() {
        let env = Environment::new();
        env.set_hidpi_mode(HiDpiMode::DeviceScale);
        let a = ScaleContext::identity(&env);
        a.set_scale(ScaleType::System.of(2.0));
        a.set_scale(ScaleType::Object.of(1.5));
        let b = ScaleContext::create_from(&a);
        assert_eq!(a, b);
        assert_eq!(pix(&b), 3.0);

        let c = ScaleContext::identity(&env);
        assert_ne!(a, c);
        assert!(c.update_from(&a));
        assert_eq!(a, c);
    }

    #[test]
    fn usable_as_map_key() {
        use std::collections::HashSet;

        let env = Environment::new();
        let a = ScaleContext::identity(&env);
        a.set_scale(ScaleType::System.of(0.0));
        let b = ScaleContext::identity(&env);
        b.set_scale(ScaleType::System.of(-0.0));
        assert_ne!(a, b);

        let mut set = HashSet::new();
        assert!(set.insert(ScaleContext::create_from(&a)));
        assert!(!set.insert(ScaleContext::create_from(&a)));
        assert!(set.insert(b));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn from_user_context() {
        let env = Environment::new();
        env.set_system_scale(2.0);
        env.set_hidpi_mode(HiDpiMode::DeviceScale);
        let user = UserScaleContext::identity(&env);
        user.set_scale(ScaleType::User.of(1.25));
        let ctx = ScaleContext::from_user_context(&user);
        assert_eq!(ctx.usr().value(), 1.25);
        assert_eq!(pix(&ctx), 2.5);
    }
}
