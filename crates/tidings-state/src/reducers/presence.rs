//! Last presence reports per user email. Never persisted.

use std::collections::BTreeMap;
use std::sync::Arc;

use tidings_shared::models::UserPresence;

use super::{initial, modify, replace};
use crate::action::Action;

pub type PresenceState = BTreeMap<String, UserPresence>;

pub fn reduce(state: &Arc<PresenceState>, action: &Action) -> Arc<PresenceState> {
    match action {
        a if a.resets_account_data() => initial(state),

        Action::PresenceResponse { presence, .. } => replace(state, presence.clone()),

        // An event carries only the clients that reported; the others keep
        // their last report.
        Action::EventPresence {
            email, presence, ..
        } => modify(state, |map| {
            let clients = map.entry(email.clone()).or_default();
            let mut changed = false;
            for (client, report) in presence {
                if clients.get(client) != Some(report) {
                    clients.insert(client.clone(), report.clone());
                    changed = true;
                }
            }
            changed
        }),

        _ => Arc::clone(state),
    }
}
