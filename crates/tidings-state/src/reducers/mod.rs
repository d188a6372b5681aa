//! One reducer per slice.
//!
//! Every reducer has the shape `fn reduce(&Arc<S>, &Action) -> Arc<S>` and
//! sees only its own slice. Whenever the action leaves the slice as it was,
//! the reducer hands back the same `Arc`, which is what lets the root reducer
//! and the selectors detect "nothing changed" by pointer comparison.

pub mod accounts;
pub mod drafts;
pub mod fetching;
pub mod messages;
pub mod mute;
pub mod outbox;
pub mod presence;
pub mod realm;
pub mod session;
pub mod settings;
pub mod streams;
pub mod subscriptions;
pub mod topics;
pub mod typing;
pub mod user_groups;
pub mod users;

use std::sync::Arc;

/// The slice's initial value, reusing `state` when it already is initial.
pub(crate) fn initial<T>(state: &Arc<T>) -> Arc<T>
where
    T: Default + PartialEq,
{
    if **state == T::default() {
        Arc::clone(state)
    } else {
        Arc::new(T::default())
    }
}

/// Replace the slice with `next`, reusing `state` when they are equal.
pub(crate) fn replace<T>(state: &Arc<T>, next: T) -> Arc<T>
where
    T: PartialEq,
{
    if **state == next {
        Arc::clone(state)
    } else {
        Arc::new(next)
    }
}

/// Run `f` on a copy of the slice. `f` reports whether it changed anything;
/// if not, the copy is dropped and `state` is reused.
pub(crate) fn modify<T, F>(state: &Arc<T>, f: F) -> Arc<T>
where
    T: Clone,
    F: FnOnce(&mut T) -> bool,
{
    let mut next = T::clone(state);
    if f(&mut next) {
        Arc::new(next)
    } else {
        Arc::clone(state)
    }
}

/// Assign `value` to `field`, reporting whether it differed.
pub(crate) fn set<T>(field: &mut T, value: T) -> bool
where
    T: PartialEq,
{
    if *field == value {
        false
    } else {
        *field = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modify_reuses_when_unchanged() {
        let state = Arc::new(vec![1, 2, 3]);
        let same = modify(&state, |_| false);
        assert!(Arc::ptr_eq(&state, &same));

        let grown = modify(&state, |v| {
            v.push(4);
            true
        });
        assert_eq!(*grown, vec![1, 2, 3, 4]);
        assert_eq!(*state, vec![1, 2, 3]);
    }

    #[test]
    fn test_initial_and_replace() {
        let empty: Arc<Vec<u32>> = Arc::new(Vec::new());
        assert!(Arc::ptr_eq(&empty, &initial(&empty)));

        let full = Arc::new(vec![7]);
        assert!(initial(&full).is_empty());
        assert!(Arc::ptr_eq(&full, &replace(&full, vec![7])));
        assert!(!Arc::ptr_eq(&full, &replace(&full, vec![8])));
    }
}
