// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Group-cached scalar values

use super::UnscaledValue;
use crate::conv::RoundingMode;
use crate::listener::{ListenerKey, UpdateListener};
use crate::Environment;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Debug)]
struct Member {
    unscaled: UnscaledValue,
    scaled: Cell<f64>,
}

impl Member {
    fn refresh(&self, scale: f64) {
        self.scaled.set(self.unscaled.resolve() * scale);
    }
}

#[derive(Debug)]
struct GroupState {
    env: Environment,
    members: RefCell<Vec<Weak<Member>>>,
}

impl GroupState {
    /// Refresh live members, dropping entries whose handles are gone
    fn refresh(&self) {
        let live: Vec<Rc<Member>> = {
            let mut members = self.members.borrow_mut();
            members.retain(|member| member.strong_count() > 0);
            members.iter().filter_map(Weak::upgrade).collect()
        };
        let scale = self.env.user_scale();
        for member in live {
            member.refresh(scale);
        }
    }

    fn live(&self) -> usize {
        self.members
            .borrow()
            .iter()
            .filter(|member| member.strong_count() > 0)
            .count()
    }
}

impl UpdateListener for GroupState {
    fn updated(&self) {
        self.refresh();
    }
}

/// A group of scalar values sharing one subscription to user-scale changes
///
/// When the user scale of the [`Environment`] changes, every member's scaled
/// value is recomputed once and cached; reads of a [`GroupedValue`] never
/// recompute. Compare with [`super::ScaledValue`], which recomputes on every
/// read.
///
/// The group holds its members weakly: a member whose last [`GroupedValue`]
/// handle is dropped is forgotten. The subscription is removed when the group
/// is dropped; members remain readable but are no longer refreshed.
pub struct ScaledValueGroup {
    state: Rc<GroupState>,
    key: ListenerKey,
}

impl ScaledValueGroup {
    /// Construct an empty group subscribed to `env`
    pub fn new(env: &Environment) -> Self {
        let state = Rc::new(GroupState {
            env: env.clone(),
            members: Default::default(),
        });
        let listener: Rc<dyn UpdateListener> = state.clone();
        let key = env.add_user_scale_listener(&listener);
        ScaledValueGroup { state, key }
    }

    /// Add a member
    pub fn value(&self, unscaled: impl Into<UnscaledValue>) -> GroupedValue {
        let member = Rc::new(Member {
            unscaled: unscaled.into(),
            scaled: Cell::new(0.0),
        });
        member.refresh(self.state.env.user_scale());
        let mut members = self.state.members.borrow_mut();
        members.retain(|member| member.strong_count() > 0);
        members.push(Rc::downgrade(&member));
        GroupedValue(member)
    }

    /// Number of live members
    pub fn len(&self) -> usize {
        self.state.live()
    }

    /// True if the group has no live members
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recompute all members now
    ///
    /// This is needed only when provider-backed members change their
    /// unscaled value without a change to the user scale.
    pub fn refresh(&self) {
        self.state.refresh();
    }
}

impl Drop for ScaledValueGroup {
    fn drop(&mut self) {
        self.state.env.remove_user_scale_listener(self.key);
    }
}

impl fmt::Debug for ScaledValueGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScaledValueGroup")
            .field("len", &self.len())
            .finish()
    }
}

/// A member of a [`ScaledValueGroup`]
#[derive(Clone, Debug)]
pub struct GroupedValue(Rc<Member>);

impl GroupedValue {
    /// The unscaled value
    #[inline]
    pub fn unscaled(&self) -> f64 {
        self.0.unscaled.resolve()
    }

    /// The cached scaled value, without rounding
    #[inline]
    pub fn get_float(&self) -> f64 {
        self.0.scaled.get()
    }

    /// The cached scaled value, rounded to the nearest integer
    #[inline]
    pub fn get(&self) -> i64 {
        self.get_rounded(RoundingMode::Round)
    }

    /// The cached scaled value, rounded with the given `mode`
    #[inline]
    pub fn get_rounded(&self, mode: RoundingMode) -> i64 {
        mode.round(self.get_float())
    }
}

impl fmt::Display for GroupedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScaledValue;

    #[test]
    fn matches_ungrouped() {
        let env = Environment::new();
        let group = ScaledValueGroup::new(&env);
        let values: Vec<_> = [1.0, 7.0, 8.0, 13.5, 100.0]
            .iter()
            .map(|v| (group.value(*v), ScaledValue::new(&env, *v)))
            .collect();
        assert_eq!(group.len(), 5);

        for scale in [1.0, 1.25, 1.5, 2.0, 0.75] {
            env.set_user_scale(scale);
            for (grouped, plain) in &values {
                assert_eq!(grouped.get(), plain.get());
                assert_eq!(grouped.get_float(), plain.get_float());
            }
        }
    }

    #[test]
    fn refreshed_on_broadcast() {
        let env = Environment::new();
        let group = ScaledValueGroup::new(&env);
        let value = group.value(8);
        assert_eq!(value.get(), 8);
        env.set_user_scale(1.25);
        assert_eq!(value.get(), 10);
    }

    #[test]
    fn dropped_group_unsubscribes() {
        let env = Environment::new();
        let group = ScaledValueGroup::new(&env);
        let value = group.value(4);
        drop(group);
        env.set_user_scale(2.0);
        assert_eq!(value.get(), 4);
    }

    #[test]
    fn dropped_members_forgotten() {
        let env = Environment::new();
        let group = ScaledValueGroup::new(&env);
        let kept = group.value(2);
        for v in 0..16 {
            drop(group.value(v));
        }
        assert_eq!(group.len(), 1);
        assert!(group.state.members.borrow().len() <= 2);

        env.set_user_scale(2.0);
        assert_eq!(group.state.members.borrow().len(), 1);
        assert_eq!(kept.get(), 4);

        drop(kept);
        group.refresh();
        assert!(group.is_empty());
        assert!(group.state.members.borrow().is_empty());
    }

    #[test]
    fn provider_refresh() {
        let env = Environment::new();
        let group = ScaledValueGroup::new(&env);
        let theme = Rc::new(Cell::new(Some(2.0)));
        let t = theme.clone();
        let value = group.value(UnscaledValue::provider(move || t.get(), 1.0));
        assert_eq!(value.get(), 2);
        theme.set(None);
        assert_eq!(value.get(), 2);
        group.refresh();
        assert_eq!(value.get(), 1);
    }
}
