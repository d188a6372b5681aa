//! The own user's subscriptions, keyed by stream id.
//!
//! A subscription may outlive its stream in the `streams` slice (the two are
//! fed by different events). Such orphans stay here and are reported by
//! `selectors::subscriptions::orphaned_subscriptions`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tidings_shared::models::Subscription;
use tidings_shared::types::{StreamId, UserId};

use super::{initial, modify, replace};
use crate::action::Action;

pub type SubscriptionsState = BTreeMap<StreamId, Subscription>;

pub fn reduce(state: &Arc<SubscriptionsState>, action: &Action) -> Arc<SubscriptionsState> {
    match action {
        Action::Rehydrate(snapshot) => Arc::clone(&snapshot.subscriptions),
        a if a.resets_account_data() => initial(state),

        Action::RegisterComplete(data) => replace(state, by_id(&data.subscriptions)),
        Action::InitSubscriptions { subscriptions } => replace(state, by_id(subscriptions)),

        Action::EventSubscriptionAdd { subscriptions, .. } => modify(state, |map| {
            let mut changed = false;
            for sub in subscriptions {
                if map.get(&sub.stream_id) != Some(sub) {
                    map.insert(sub.stream_id, sub.clone());
                    changed = true;
                }
            }
            changed
        }),

        Action::EventSubscriptionRemove { stream_ids, .. } => modify(state, |map| {
            let mut changed = false;
            for id in stream_ids {
                changed |= map.remove(id).is_some();
            }
            changed
        }),

        // Stream renames and description changes are mirrored on the
        // subscription, which carries its own copy of those fields.
        Action::EventSubscriptionUpdate {
            stream_id,
            property,
            value,
            ..
        }
        | Action::EventStreamUpdate {
            stream_id,
            property,
            value,
            ..
        } => {
            if !state.contains_key(stream_id) {
                return Arc::clone(state);
            }
            modify(state, |map| {
                map.get_mut(stream_id)
                    .map(|sub| sub.set_property(property, value))
                    .unwrap_or(false)
            })
        }

        Action::EventSubscriptionPeerAdd {
            stream_ids,
            user_id,
            ..
        } => update_subscribers(state, stream_ids, |subscribers| {
            subscribers.insert(*user_id)
        }),

        Action::EventSubscriptionPeerRemove {
            stream_ids,
            user_id,
            ..
        } => update_subscribers(state, stream_ids, |subscribers| {
            subscribers.remove(user_id)
        }),

        _ => Arc::clone(state),
    }
}

fn by_id(subscriptions: &[Subscription]) -> SubscriptionsState {
    subscriptions
        .iter()
        .map(|s| (s.stream_id, s.clone()))
        .collect()
}

/// Apply `f` to the subscriber set of each named stream we are subscribed to.
fn update_subscribers<F>(
    state: &Arc<SubscriptionsState>,
    stream_ids: &[StreamId],
    mut f: F,
) -> Arc<SubscriptionsState>
where
    F: FnMut(&mut BTreeSet<UserId>) -> bool,
{
    modify(state, |map| {
        let mut changed = false;
        for id in stream_ids {
            if let Some(sub) = map.get_mut(id) {
                changed |= f(&mut sub.subscribers);
            }
        }
        changed
    })
}
