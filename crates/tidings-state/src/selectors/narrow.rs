//! Views of the state restricted to one narrow.

use tidings_shared::constants::{
    FLAG_MENTIONED, FLAG_STARRED, FLAG_WILDCARD_MENTIONED, TYPING_EXPIRY_SECS,
};
use tidings_shared::models::{Destination, Message, Outbox};
use tidings_shared::narrow::Narrow;
use tidings_shared::types::{normalize_user_ids, ConversationKey, UserId};

use super::accounts::own_user_id;
use super::subscriptions::is_topic_muted;
use crate::reducers::fetching::FetchStatus;
use crate::snapshot::Snapshot;

fn private_matches(participants: &[UserId], user_ids: &[UserId], own: Option<UserId>) -> bool {
    let wanted = normalize_user_ids(user_ids.iter().copied());
    let mut others: Vec<UserId> = participants
        .iter()
        .copied()
        .filter(|id| Some(*id) != own)
        .collect();
    if others.is_empty() {
        others.extend(own);
    }
    !wanted.is_empty() && others == wanted
}

/// Whether a conversation addressed to `destination` belongs to `narrow`.
/// Narrows defined by message flags or content never match here.
fn destination_in_narrow(destination: &Destination, narrow: &Narrow, own: Option<UserId>) -> bool {
    match (narrow, destination) {
        (Narrow::Home, _) => true,
        (Narrow::Stream { stream }, Destination::Stream { stream: s, .. }) => s == stream,
        (
            Narrow::Topic { stream, topic },
            Destination::Stream {
                stream: s, topic: t, ..
            },
        ) => s == stream && t.eq_ignore_ascii_case(topic),
        (Narrow::Private { user_ids }, Destination::Private { participants }) => {
            private_matches(participants, user_ids, own)
        }
        (Narrow::AllPrivate, Destination::Private { .. }) => true,
        _ => false,
    }
}

/// Whether `message` is shown in `narrow`, as seen by `own_user_id`.
/// Topic names compare case-insensitively, like the server does.
pub fn is_message_in_narrow(message: &Message, narrow: &Narrow, own_user_id: Option<UserId>) -> bool {
    match narrow {
        Narrow::Starred => message.has_flag(FLAG_STARRED),
        Narrow::Mentioned => {
            message.has_flag(FLAG_MENTIONED) || message.has_flag(FLAG_WILDCARD_MENTIONED)
        }
        Narrow::Search { query } => message
            .content
            .to_lowercase()
            .contains(&query.to_lowercase()),
        _ => destination_in_narrow(&message.destination, narrow, own_user_id),
    }
}

/// Loaded messages of a narrow, oldest first.
pub fn messages_for_narrow<'a>(snapshot: &'a Snapshot, narrow: &Narrow) -> Vec<&'a Message> {
    let own = own_user_id(snapshot);
    snapshot
        .messages
        .values()
        .filter(|m| is_message_in_narrow(m, narrow, own))
        .collect()
}

/// Pending outbox entries to show at the bottom of a narrow.
pub fn outbox_for_narrow<'a>(snapshot: &'a Snapshot, narrow: &Narrow) -> Vec<&'a Outbox> {
    let own = own_user_id(snapshot);
    snapshot
        .outbox
        .iter()
        .filter(|o| destination_in_narrow(&o.destination, narrow, own))
        .collect()
}

/// Unread loaded messages of a narrow. Muted topics do not count.
pub fn unread_count_for_narrow(snapshot: &Snapshot, narrow: &Narrow) -> usize {
    messages_for_narrow(snapshot, narrow)
        .into_iter()
        .filter(|m| !m.is_read())
        .filter(|m| match m.stream_and_topic() {
            Some((stream, topic)) => !is_topic_muted(snapshot, stream, topic),
            None => true,
        })
        .count()
}

pub fn fetch_status(snapshot: &Snapshot, narrow: &Narrow) -> FetchStatus {
    snapshot
        .fetching
        .get(&narrow.key())
        .copied()
        .unwrap_or_default()
}

pub fn draft_for_narrow<'a>(snapshot: &'a Snapshot, narrow: &Narrow) -> Option<&'a str> {
    let key = narrow.conversation_key()?;
    snapshot.drafts.get(&key).map(String::as_str)
}

/// Users currently typing in a private narrow.
pub fn typing_users_for_narrow(snapshot: &Snapshot, narrow: &Narrow) -> Vec<UserId> {
    if !matches!(narrow, Narrow::Private { .. }) {
        return Vec::new();
    }
    narrow
        .conversation_key()
        .and_then(|key| snapshot.typing.get(&key))
        .map(|entry| entry.user_ids.clone())
        .unwrap_or_default()
}

/// Typing indicators not refreshed within the expiry window, ready for
/// `Action::ClearTyping`.
pub fn typing_expired_keys(snapshot: &Snapshot, now: i64) -> Vec<ConversationKey> {
    snapshot
        .typing
        .iter()
        .filter(|(_, entry)| now - entry.time > TYPING_EXPIRY_SECS)
        .map(|(key, _)| key.clone())
        .collect()
}
