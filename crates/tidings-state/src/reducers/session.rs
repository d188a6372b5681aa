//! Runtime state of the running client. Never persisted.

use std::sync::Arc;

use tidings_shared::narrow::Narrow;
use tidings_shared::types::MessageId;

use super::{modify, replace, set};
use crate::action::Action;

/// The message currently being edited by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditMessage {
    pub message_id: MessageId,
    pub content: String,
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    // Device state, kept across account switches.
    pub is_online: bool,
    pub is_active: bool,
    pub is_hydrated: bool,
    pub push_token: Option<String>,

    // Per-account state.
    pub needs_initial_fetch: bool,
    pub loading: bool,
    pub queue_id: Option<String>,
    /// Highest event id applied; -1 before the first event.
    pub last_event_id: i64,
    pub narrow: Option<Narrow>,
    pub outbox_sending: bool,
    pub edit_message: Option<EditMessage>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            is_online: true,
            is_active: true,
            is_hydrated: false,
            push_token: None,
            needs_initial_fetch: false,
            loading: false,
            queue_id: None,
            last_event_id: -1,
            narrow: None,
            outbox_sending: false,
            edit_message: None,
        }
    }
}

impl SessionState {
    /// Same device state, fresh per-account state.
    fn for_new_account(&self, needs_initial_fetch: bool) -> Self {
        Self {
            is_online: self.is_online,
            is_active: self.is_active,
            is_hydrated: self.is_hydrated,
            push_token: self.push_token.clone(),
            needs_initial_fetch,
            ..Self::default()
        }
    }
}

pub fn reduce(state: &Arc<SessionState>, action: &Action) -> Arc<SessionState> {
    match action {
        Action::Rehydrate(_) => modify(state, |s| set(&mut s.is_hydrated, true)),

        Action::AccountSwitch { .. } | Action::LoginSuccess { .. } => {
            replace(state, state.for_new_account(true))
        }
        Action::Logout => replace(state, state.for_new_account(false)),

        Action::AppOnline { is_online } => modify(state, |s| set(&mut s.is_online, *is_online)),
        Action::AppState { is_active } => modify(state, |s| set(&mut s.is_active, *is_active)),
        Action::GotPushToken { push_token } => {
            modify(state, |s| set(&mut s.push_token, Some(push_token.clone())))
        }

        Action::DeadQueue => modify(state, |s| {
            set(&mut s.needs_initial_fetch, true) | set(&mut s.queue_id, None)
        }),
        Action::InitialFetchStart => modify(state, |s| set(&mut s.loading, true)),
        Action::InitialFetchComplete => modify(state, |s| {
            set(&mut s.loading, false) | set(&mut s.needs_initial_fetch, false)
        }),
        Action::RegisterComplete(data) => modify(state, |s| {
            set(&mut s.queue_id, data.queue_id.clone())
                | set(&mut s.last_event_id, data.last_event_id)
                | set(&mut s.needs_initial_fetch, false)
        }),

        Action::DoNarrow { narrow } => modify(state, |s| set(&mut s.narrow, Some(narrow.clone()))),
        Action::ToggleOutboxSending { sending } => {
            modify(state, |s| set(&mut s.outbox_sending, *sending))
        }
        Action::StartEditMessage {
            message_id,
            content,
            topic,
        } => modify(state, |s| {
            set(
                &mut s.edit_message,
                Some(EditMessage {
                    message_id: *message_id,
                    content: content.clone(),
                    topic: topic.clone(),
                }),
            )
        }),
        Action::CancelEditMessage => modify(state, |s| set(&mut s.edit_message, None)),

        _ => match action.event_id() {
            Some(id) if id.0 > state.last_event_id => {
                modify(state, |s| set(&mut s.last_event_id, id.0))
            }
            _ => Arc::clone(state),
        },
    }
}
