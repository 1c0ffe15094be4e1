// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! KAS scale library
//!
//! UI measurements are expressed once in unscaled units and converted to
//! pixels under the currently active scale factors:
//!
//! -   An [`Environment`] holds the global state: the user scale, the default
//!     system scale and the [`HiDpiMode`]
//! -   A [`Scale`] is an interned `(value, type)` pair; see [`ScaleType`]
//! -   [`UserScaleContext`] and [`ScaleContext`] capture a snapshot of scale
//!     factors, optionally overriding some
//! -   A [`Scaler`] aligns geometry which may already be expressed at some
//!     scale to the current one
//! -   [`ScaledValue`], [`ScaledValueGroup`], [`ScaledSize`] and
//!     [`ScaledInsets`] are measurements which rescale themselves
//!
//! All types are intended for use on a single (UI) thread; those holding
//! shared state are neither `Send` nor `Sync`.
//!
//! ```
//! use kas_scale::{Environment, ScaledSize, ScaledValue};
//!
//! let env = Environment::new();
//! let gap = ScaledValue::new(&env, 8);
//! let icon = ScaledSize::new(&env, 16.0, 16.0);
//! env.set_user_scale(1.25);
//! assert_eq!(gap.get(), 10);
//! assert_eq!(icon.width(), 20);
//! ```

pub mod conv;
pub use conv::RoundingMode;

mod env;
pub use env::*;

pub mod geom;

mod listener;
pub use listener::{ListenerKey, ListenerList, UpdateListener};

mod scale;
pub use scale::*;

mod scaler;
pub use scaler::Scaler;

mod context;
pub use context::*;

mod value;
pub use value::*;
