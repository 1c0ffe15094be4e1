// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Update listeners
//!
//! Listeners are held weakly: registration never keeps an observer alive.
//! Registration returns a [`ListenerKey`] which may be used to unregister
//! explicitly; entries whose observer has been dropped are pruned on the next
//! notification.

use smallvec::SmallVec;
use std::fmt;
use std::rc::{Rc, Weak};

/// An observer of scale updates
///
/// This is implemented for all `Fn()` closures.
pub trait UpdateListener {
    /// Called synchronously after an update
    fn updated(&self);
}

impl<F: Fn()> UpdateListener for F {
    #[inline]
    fn updated(&self) {
        self()
    }
}

/// Registration token returned when adding a listener
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerKey(u64);

/// An ordered list of weakly-held listeners
///
/// Adding the same listener twice results in two registrations (and two
/// notifications per update).
#[derive(Default)]
pub struct ListenerList {
    next_key: u64,
    entries: Vec<(ListenerKey, Weak<dyn UpdateListener>)>,
}

impl ListenerList {
    /// Construct an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn add(&mut self, listener: &Rc<dyn UpdateListener>) -> ListenerKey {
        let key = ListenerKey(self.next_key);
        self.next_key += 1;
        self.entries.push((key, Rc::downgrade(listener)));
        key
    }

    /// Unregister a listener
    ///
    /// Returns true if `key` was registered.
    pub fn remove(&mut self, key: ListenerKey) -> bool {
        let len = self.entries.len();
        self.entries.retain(|(k, _)| *k != key);
        self.entries.len() != len
    }

    /// Unregister all listeners
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of registrations, including those not yet pruned
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no listener is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collect live listeners in registration order, pruning dead entries
    ///
    /// Callers holding the list behind a `RefCell` should release the borrow
    /// before invoking the result, allowing listeners to re-enter.
    pub fn live(&mut self) -> SmallVec<[Rc<dyn UpdateListener>; 4]> {
        let mut live = SmallVec::new();
        self.entries.retain(|(_, weak)| match weak.upgrade() {
            Some(rc) => {
                live.push(rc);
                true
            }
            None => false,
        });
        live
    }

    /// Notify all live listeners
    pub fn notify(&mut self) {
        for listener in self.live() {
            listener.updated();
        }
    }
}

impl fmt::Debug for ListenerList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerList")
            .field("len", &self.entries.len())
            .finish()
    }
}
