//! Shared size scopes: keeping tracks of several grids the same size.
//!
//! Each grid attached to a scope publishes the content minimum of its
//! tracks that name a group. A track's effective minimum is the largest
//! minimum published for its group by any grid in the scope.

use crate::definition::Axis;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Identity of one grid within a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct OwnerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ContributionKey {
    owner: OwnerId,
    axis: Axis,
    index: usize,
}

#[derive(Debug, Default)]
struct ScopeState {
    next_owner: u64,
    groups: HashMap<String, HashMap<ContributionKey, f64>>,
}

/// A set of named size groups shared between grids.
///
/// Cloning yields another handle to the same scope. Scopes are confined to
/// the thread that created them, like the grids that use them.
#[derive(Debug, Clone, Default)]
pub struct SharedSizeScope {
    state: Rc<RefCell<ScopeState>>,
}

impl SharedSizeScope {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current size of a group: the largest minimum any grid published.
    #[must_use]
    pub fn group_size(&self, group: &str) -> Option<f64> {
        self.state
            .borrow()
            .groups
            .get(group)
            .and_then(|contributions| contributions.values().copied().reduce(f64::max))
    }

    /// Names of groups with at least one contribution.
    #[must_use]
    pub fn groups(&self) -> Vec<String> {
        let state = self.state.borrow();
        let mut names: Vec<String> = state
            .groups
            .iter()
            .filter(|(_, contributions)| !contributions.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    pub(crate) fn register(&self) -> OwnerId {
        let mut state = self.state.borrow_mut();
        let id = OwnerId(state.next_owner);
        state.next_owner += 1;
        id
    }

    /// Remove everything `owner` has published.
    pub(crate) fn withdraw(&self, owner: OwnerId) {
        let mut state = self.state.borrow_mut();
        for contributions in state.groups.values_mut() {
            contributions.retain(|key, _| key.owner != owner);
        }
        state.groups.retain(|_, contributions| !contributions.is_empty());
    }

    pub(crate) fn publish(&self, owner: OwnerId, axis: Axis, index: usize, group: &str, size: f64) {
        let key = ContributionKey { owner, axis, index };
        self.state
            .borrow_mut()
            .groups
            .entry(group.to_string())
            .or_default()
            .insert(key, size);
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scope() {
        let scope = SharedSizeScope::new();
        assert_eq!(scope.group_size("A"), None);
        assert!(scope.groups().is_empty());
    }

    #[test]
    fn test_group_size_is_max_of_owners() {
        let scope = SharedSizeScope::new();
        let a = scope.register();
        let b = scope.register();
        assert_ne!(a, b);

        scope.publish(a, Axis::Column, 0, "Label", 40.0);
        scope.publish(b, Axis::Column, 2, "Label", 65.0);
        scope.publish(b, Axis::Row, 0, "Header", 12.0);

        assert_eq!(scope.group_size("Label"), Some(65.0));
        assert_eq!(scope.groups(), vec!["Header".to_string(), "Label".to_string()]);
    }

    #[test]
    fn test_publish_replaces_own_value() {
        let scope = SharedSizeScope::new();
        let a = scope.register();
        scope.publish(a, Axis::Column, 0, "G", 80.0);
        scope.publish(a, Axis::Column, 0, "G", 30.0);
        assert_eq!(scope.group_size("G"), Some(30.0));
    }

    #[test]
    fn test_withdraw_removes_only_owner() {
        let scope = SharedSizeScope::new();
        let a = scope.register();
        let b = scope.register();
        scope.publish(a, Axis::Column, 0, "G", 80.0);
        scope.publish(b, Axis::Column, 0, "G", 30.0);

        scope.withdraw(a);
        assert_eq!(scope.group_size("G"), Some(30.0));
        scope.withdraw(b);
        assert_eq!(scope.group_size("G"), None);
    }

    #[test]
    fn test_clones_share_state() {
        let scope = SharedSizeScope::new();
        let other = scope.clone();
        let a = other.register();
        other.publish(a, Axis::Row, 1, "G", 5.0);
        assert_eq!(scope.group_size("G"), Some(5.0));
        assert!(scope.ptr_eq(&other));
        assert!(!scope.ptr_eq(&SharedSizeScope::new()));
    }
}
