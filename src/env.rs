// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! KAS scale library — scale environment

use crate::listener::{ListenerKey, ListenerList, UpdateListener};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

/// Strategy used to support high-density displays
///
/// This is a global choice. Its only effect is on
/// [`DerivedScaleType::Device`](crate::DerivedScaleType::Device): see
/// [`Environment::device_scale`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HiDpiMode {
    /// The UI scales itself; the device factor is `1`
    ///
    /// Under this strategy the system scale is typically folded into the
    /// user scale by whoever configures the [`Environment`].
    #[default]
    Emulated,
    /// The display backend applies the system scale when rasterizing
    DeviceScale,
}

/// Unrecognised [`HiDpiMode`] name
#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown HiDPI mode '{0}' (expected 'emulated' or 'device')")]
pub struct ParseHiDpiModeError(pub String);

impl FromStr for HiDpiMode {
    type Err = ParseHiDpiModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "emulated" => Ok(HiDpiMode::Emulated),
            "device" => Ok(HiDpiMode::DeviceScale),
            _ => Err(ParseHiDpiModeError(s.to_string())),
        }
    }
}

/// Configuration of an [`Environment`]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnvConfig {
    /// The user zoom factor
    pub user_scale: f64,
    /// System scale assumed by contexts not bound to a display surface
    pub system_scale: f64,
    /// HiDPI strategy
    pub hidpi_mode: HiDpiMode,
}

impl Default for EnvConfig {
    fn default() -> Self {
        EnvConfig {
            user_scale: 1.0,
            system_scale: 1.0,
            hidpi_mode: HiDpiMode::default(),
        }
    }
}

struct EnvState {
    config: Cell<EnvConfig>,
    listeners: RefCell<ListenerList>,
}

/// Environment in which measurements are scaled
///
/// This holds the global scale state: the current user scale, the default
/// system scale and the [`HiDpiMode`], plus the list of observers to notify
/// when any of these change.
///
/// An `Environment` is a shared handle: clones refer to the same state. It is
/// neither `Send` nor `Sync`; all scale computation happens on the UI thread.
#[derive(Clone)]
pub struct Environment(Rc<EnvState>);

impl Default for Environment {
    fn default() -> Self {
        Environment::from_config(&EnvConfig::default())
    }
}

impl Environment {
    /// Construct with default configuration (all factors `1`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct from a configuration
    pub fn from_config(config: &EnvConfig) -> Self {
        Environment(Rc::new(EnvState {
            config: Cell::new(*config),
            listeners: Default::default(),
        }))
    }

    /// Get a copy of the current configuration
    #[inline]
    pub fn config(&self) -> EnvConfig {
        self.0.config.get()
    }

    /// The current user scale
    #[inline]
    pub fn user_scale(&self) -> f64 {
        self.config().user_scale
    }

    /// The system scale of the default display
    #[inline]
    pub fn system_scale(&self) -> f64 {
        self.config().system_scale
    }

    /// The HiDPI strategy
    #[inline]
    pub fn hidpi_mode(&self) -> HiDpiMode {
        self.config().hidpi_mode
    }

    /// The device factor corresponding to a given system scale
    ///
    /// This is `sys_scale` under [`HiDpiMode::DeviceScale`], otherwise `1`.
    /// All other computations are expressed in terms of this value.
    #[inline]
    pub fn device_scale(&self, sys_scale: f64) -> f64 {
        match self.hidpi_mode() {
            HiDpiMode::DeviceScale => sys_scale,
            HiDpiMode::Emulated => 1.0,
        }
    }

    /// Scale `value` by the current user scale
    #[inline]
    pub fn scale(&self, value: f64) -> f64 {
        value * self.user_scale()
    }

    /// Scale a font size by the current user scale
    ///
    /// Some user scales are adjusted to land on sizes which render well.
    pub fn scale_font_size(&self, size: f32) -> f32 {
        let scale = self.user_scale();
        if scale == 1.25 {
            size * 1.34
        } else if scale == 1.75 {
            size * 1.67
        } else {
            (f64::from(size) * scale) as f32
        }
    }

    /// True if the user scale is above `1`
    #[inline]
    pub fn is_usr_hidpi(&self) -> bool {
        self.user_scale() > 1.0
    }

    /// Set the user scale
    ///
    /// Returns true and notifies listeners if the value changed.
    pub fn set_user_scale(&self, scale: f64) -> bool {
        self.update(|u| u.set_user_scale(scale))
    }

    /// Set the user scale after rounding to a quarter step
    ///
    /// The result is not allowed below `1` unless the system scale is too.
    pub fn set_normalized_user_scale(&self, scale: f64) -> bool {
        let mut scale = discrete_scale(scale);
        if scale < 1.0 && self.system_scale() >= 1.0 {
            scale = 1.0;
        }
        self.set_user_scale(scale)
    }

    /// Set the default system scale
    pub fn set_system_scale(&self, scale: f64) -> bool {
        self.update(|u| u.set_system_scale(scale))
    }

    /// Set the HiDPI strategy
    pub fn set_hidpi_mode(&self, mode: HiDpiMode) -> bool {
        self.update(|u| u.set_hidpi_mode(mode))
    }

    /// Apply several changes, notifying listeners at most once
    ///
    /// Returns true if anything changed.
    pub fn update(&self, f: impl FnOnce(&mut UpdateEnv)) -> bool {
        let mut config = self.config();
        let mut update = UpdateEnv::new(&mut config);
        f(&mut update);
        if !update.finish() {
            return false;
        }

        let old = self.0.config.replace(config);
        if old.user_scale.to_bits() != config.user_scale.to_bits() {
            log::debug!(
                "user scale changed: {} -> {}",
                old.user_scale,
                config.user_scale
            );
        }
        self.notify_listeners();
        true
    }

    /// Register a listener for changes to this environment
    ///
    /// The listener is held weakly.
    pub fn add_user_scale_listener(&self, listener: &Rc<dyn UpdateListener>) -> ListenerKey {
        self.0.listeners.borrow_mut().add(listener)
    }

    /// Unregister a listener
    pub fn remove_user_scale_listener(&self, key: ListenerKey) -> bool {
        self.0.listeners.borrow_mut().remove(key)
    }

    fn notify_listeners(&self) {
        let live = self.0.listeners.borrow_mut().live();
        for listener in live {
            listener.updated();
        }
    }

    /// True if `self` and `other` share state
    #[inline]
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("config", &self.config())
            .field("listeners", &self.0.listeners.borrow().len())
            .finish()
    }
}

/// Round a scale to the nearest quarter step
pub fn discrete_scale(scale: f64) -> f64 {
    (scale * 4.0).round() / 4.0
}

/// Helper to modify an environment
#[derive(Debug)]
pub struct UpdateEnv<'a> {
    config: &'a mut EnvConfig,
    changed: bool,
}

impl<'a> UpdateEnv<'a> {
    fn new(config: &'a mut EnvConfig) -> Self {
        UpdateEnv {
            config,
            changed: false,
        }
    }

    fn finish(self) -> bool {
        self.changed
    }

    /// Read access to the configuration
    pub fn config(&self) -> &EnvConfig {
        self.config
    }

    /// Set the user scale
    ///
    /// Values are compared bitwise; setting `NaN` twice is not a change.
    pub fn set_user_scale(&mut self, scale: f64) {
        if scale.to_bits() != self.config.user_scale.to_bits() {
            self.config.user_scale = scale;
            self.changed = true;
        }
    }

    /// Set the default system scale
    pub fn set_system_scale(&mut self, scale: f64) {
        if scale.to_bits() != self.config.system_scale.to_bits() {
            self.config.system_scale = scale;
            self.changed = true;
        }
    }

    /// Set the HiDPI strategy
    pub fn set_hidpi_mode(&mut self, mode: HiDpiMode) {
        if mode != self.config.hidpi_mode {
            self.config.hidpi_mode = mode;
            self.changed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_scale_follows_mode() {
        let env = Environment::new();
        assert_eq!(env.device_scale(2.0), 1.0);
        env.set_hidpi_mode(HiDpiMode::DeviceScale);
        assert_eq!(env.device_scale(2.0), 2.0);
    }

    #[test]
    fn broadcast_once_per_batch() {
        let env = Environment::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let listener: Rc<dyn UpdateListener> = Rc::new(move || c.set(c.get() + 1));
        env.add_user_scale_listener(&listener);

        assert!(env.update(|u| {
            u.set_user_scale(2.0);
            u.set_system_scale(1.5);
        }));
        assert_eq!(count.get(), 1);
        assert!(!env.set_user_scale(2.0));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn repeated_nan_is_not_a_change() {
        let env = Environment::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let listener: Rc<dyn UpdateListener> = Rc::new(move || c.set(c.get() + 1));
        env.add_user_scale_listener(&listener);

        assert!(env.set_user_scale(f64::NAN));
        assert!(!env.set_user_scale(f64::NAN));
        assert!(env.set_system_scale(f64::NAN));
        assert!(!env.set_system_scale(f64::NAN));
        assert_eq!(count.get(), 2);
        assert!(env.user_scale().is_nan());
    }

    #[test]
    fn listener_removed() {
        let env = Environment::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let listener: Rc<dyn UpdateListener> = Rc::new(move || c.set(c.get() + 1));
        let key = env.add_user_scale_listener(&listener);
        assert!(env.remove_user_scale_listener(key));
        env.set_user_scale(3.0);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn listener_may_read_env() {
        let env = Environment::new();
        let seen = Rc::new(Cell::new(0.0));
        let (e, s) = (env.clone(), seen.clone());
        let listener: Rc<dyn UpdateListener> = Rc::new(move || s.set(e.user_scale()));
        env.add_user_scale_listener(&listener);
        env.set_user_scale(1.75);
        assert_eq!(seen.get(), 1.75);
    }

    #[test]
    fn normalized() {
        let env = Environment::new();
        env.set_normalized_user_scale(1.3);
        assert_eq!(env.user_scale(), 1.25);
        env.set_normalized_user_scale(0.8);
        assert_eq!(env.user_scale(), 1.0);
    }

    #[test]
    fn font_size() {
        let env = Environment::new();
        env.set_user_scale(2.0);
        assert_eq!(env.scale_font_size(12.0), 24.0);
        env.set_user_scale(1.25);
        assert_eq!(env.scale_font_size(10.0), 10.0 * 1.34);
    }

    #[test]
    fn parse_mode() {
        assert_eq!("device".parse::<HiDpiMode>(), Ok(HiDpiMode::DeviceScale));
        assert!("retina".parse::<HiDpiMode>().is_err());
    }
}
