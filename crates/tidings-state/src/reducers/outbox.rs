//! Locally composed messages awaiting confirmation from the server.

use std::sync::Arc;

use tidings_shared::models::Outbox;
use tidings_shared::types::LocalMessageId;

use super::{initial, modify};
use crate::action::Action;

/// In send order.
pub type OutboxState = Vec<Outbox>;

pub fn reduce(state: &Arc<OutboxState>, action: &Action) -> Arc<OutboxState> {
    match action {
        Action::Rehydrate(snapshot) => Arc::clone(&snapshot.outbox),
        a if a.resets_account_data() => initial(state),

        Action::MessageSendStart(entry) => modify(state, |outbox| {
            match outbox
                .iter_mut()
                .find(|o| o.local_message_id == entry.local_message_id)
            {
                Some(existing) if *existing == **entry => false,
                Some(existing) => {
                    *existing = Outbox::clone(entry);
                    true
                }
                None => {
                    outbox.push(Outbox::clone(entry));
                    true
                }
            }
        }),

        Action::MessageSendComplete { local_message_id }
        | Action::DeleteOutboxMessage { local_message_id }
        | Action::EventNewMessage {
            local_message_id: Some(local_message_id),
            ..
        } => remove(state, *local_message_id),

        Action::MessageSendFailed { local_message_id } => modify(state, |outbox| {
            match outbox
                .iter_mut()
                .find(|o| o.local_message_id == *local_message_id)
            {
                Some(entry) if !entry.failed => {
                    entry.failed = true;
                    true
                }
                _ => false,
            }
        }),

        _ => Arc::clone(state),
    }
}

fn remove(state: &Arc<OutboxState>, local_message_id: LocalMessageId) -> Arc<OutboxState> {
    if !state.iter().any(|o| o.local_message_id == local_message_id) {
        return Arc::clone(state);
    }
    modify(state, |outbox| {
        outbox.retain(|o| o.local_message_id != local_message_id);
        true
    })
}
