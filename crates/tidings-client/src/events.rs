//! Translation of event-queue payloads into actions.
//!
//! A payload missing a field its kind requires is rejected with a
//! [`TranslateError`] and never reaches the reducers. A well-formed payload
//! whose `type`, or `op` within a known type, is not recognized becomes
//! [`Action::Unknown`] so the queue keeps moving.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tidings_shared::constants::FLAG_READ;
use tidings_shared::error::ProtocolError;
use tidings_shared::models::{
    Message, MutedTopic, Reaction, RealmEmoji, RealmFilter, Stream, Subscription, User,
    UserGroup, UserPresence,
};
use tidings_shared::protocol::{WireMessage, WireReaction};
use tidings_shared::types::{EventId, GroupId, LocalMessageId, MessageId, StreamId, UserId};
use tidings_state::action::FlagOperation;
use tidings_state::selectors::accounts::own_user_id;
use tidings_state::{Action, Snapshot};

/// Event kinds with no slice behind them.
const IGNORED_TYPES: &[&str] = &[
    "heartbeat",
    "pointer",
    "restart",
    "alert_words",
    "attachment",
    "hotspots",
    "realm",
    "realm_bot",
    "realm_domains",
    "custom_profile_fields",
    "default_streams",
    "default_stream_groups",
    "submessage",
    "user_status",
];

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("event has no `type`")]
    MissingType,

    #[error("malformed `{kind}` event: {source}")]
    Malformed {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("`{0}` event received before the own user id is known")]
    NoOwnUser(&'static str),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

pub type Result<T> = std::result::Result<T, TranslateError>;

// ---------------------------------------------------------------------------
// Payload shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct Envelope {
    id: EventId,
    #[serde(default)]
    op: Option<String>,
}

#[derive(Deserialize)]
struct MessageEvent {
    message: WireMessage,
    #[serde(default)]
    flags: Vec<String>,
    #[serde(default)]
    local_message_id: Option<Value>,
}

#[derive(Deserialize)]
struct DeleteMessage {
    #[serde(default)]
    message_id: Option<MessageId>,
    #[serde(default)]
    message_ids: Vec<MessageId>,
}

#[derive(Deserialize)]
struct UpdateMessage {
    message_id: MessageId,
    #[serde(default)]
    rendered_content: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    edit_timestamp: Option<i64>,
}

#[derive(Deserialize)]
struct UpdateMessageFlags {
    flag: String,
    /// Older servers name the operation here instead of in `op`.
    #[serde(default)]
    operation: Option<String>,
    #[serde(default)]
    messages: Vec<MessageId>,
    #[serde(default)]
    all: bool,
}

#[derive(Deserialize)]
struct MessageRef {
    message_id: MessageId,
}

#[derive(Deserialize)]
struct PresenceEvent {
    email: String,
    server_timestamp: f64,
    presence: UserPresence,
}

#[derive(Deserialize)]
struct TypingUser {
    user_id: UserId,
}

#[derive(Deserialize)]
struct TypingEvent {
    sender: TypingUser,
    #[serde(default)]
    recipients: Vec<TypingUser>,
    #[serde(default)]
    message_type: Option<String>,
}

#[derive(Deserialize)]
struct PersonEvent<T> {
    person: T,
}

#[derive(Deserialize)]
struct PersonRef {
    user_id: UserId,
}

#[derive(Deserialize)]
struct PersonUpdate {
    user_id: UserId,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default, alias = "new_email")]
    email: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
}

#[derive(Deserialize)]
struct MutedTopicsEvent {
    muted_topics: Vec<MutedTopic>,
}

#[derive(Deserialize)]
struct GroupEvent {
    group: UserGroup,
}

#[derive(Deserialize)]
struct GroupRef {
    group_id: GroupId,
}

#[derive(Deserialize, Default)]
struct GroupData {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct GroupUpdate {
    group_id: GroupId,
    #[serde(default)]
    data: GroupData,
}

#[derive(Deserialize)]
struct GroupMembers {
    group_id: GroupId,
    user_ids: Vec<UserId>,
}

#[derive(Deserialize)]
struct StreamsEvent {
    streams: Vec<Stream>,
}

#[derive(Deserialize)]
struct StreamRef {
    stream_id: StreamId,
}

#[derive(Deserialize)]
struct StreamRefs {
    streams: Vec<StreamRef>,
}

#[derive(Deserialize)]
struct SubscriptionsEvent {
    subscriptions: Vec<Subscription>,
}

#[derive(Deserialize)]
struct SubscriptionRefs {
    subscriptions: Vec<StreamRef>,
}

#[derive(Deserialize)]
struct PropertyUpdate {
    stream_id: StreamId,
    property: String,
    value: Value,
}

/// `peer_add` / `peer_remove`. Current servers send `stream_ids`; older ones
/// a single `stream_id`, or the stream names in `subscriptions`.
#[derive(Deserialize)]
struct PeerEvent {
    #[serde(default)]
    stream_ids: Vec<StreamId>,
    #[serde(default)]
    stream_id: Option<StreamId>,
    #[serde(default)]
    subscriptions: Vec<String>,
    user_id: UserId,
}

#[derive(Deserialize)]
struct RealmEmojiEvent {
    realm_emoji: BTreeMap<String, RealmEmoji>,
}

#[derive(Deserialize)]
struct RealmFiltersEvent {
    realm_filters: Vec<RealmFilter>,
}

#[derive(Deserialize)]
struct DisplaySettingsEvent {
    setting_name: String,
    setting: Value,
}

#[derive(Deserialize)]
struct NotificationsEvent {
    notification_name: String,
    setting: bool,
}

fn parse<T: DeserializeOwned>(event: &Value, kind: &str) -> Result<T> {
    T::deserialize(event).map_err(|source| TranslateError::Malformed {
        kind: kind.to_string(),
        source,
    })
}

fn require_own_user(snapshot: &Snapshot, kind: &'static str) -> Result<UserId> {
    own_user_id(snapshot).ok_or(TranslateError::NoOwnUser(kind))
}

/// Clients send the local id back as a number or a numeric string, possibly
/// with a zero fraction.
fn parse_local_id(value: &Value) -> Option<LocalMessageId> {
    let whole = |f: f64| (f >= 0.0 && f.fract() == 0.0).then_some(f as u64);
    let id = match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(whole)),
        Value::String(s) => s
            .parse::<u64>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().and_then(whole)),
        _ => None,
    };
    id.map(LocalMessageId)
}

fn flag_operation(op: &str) -> Option<FlagOperation> {
    match op {
        "add" => Some(FlagOperation::Add),
        "remove" => Some(FlagOperation::Remove),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Translation
// ---------------------------------------------------------------------------

/// Translate one event payload, using the wall clock for events the server
/// does not timestamp.
pub fn translate(snapshot: &Snapshot, event: &Value) -> Result<Action> {
    translate_at(snapshot, event, Utc::now().timestamp())
}

/// Translate one event payload as received at `now` (Unix seconds).
///
/// `snapshot` supplies context the action must carry: the own user id, and
/// the stream ids behind stream names in legacy payloads.
pub fn translate_at(snapshot: &Snapshot, event: &Value, now: i64) -> Result<Action> {
    let kind = event
        .get("type")
        .and_then(Value::as_str)
        .ok_or(TranslateError::MissingType)?;
    let Envelope { id, op } = parse(event, kind)?;
    let op = op.as_deref();

    let unknown = || {
        tracing::warn!(event_id = id.0, kind, op = ?op, "unrecognized event");
        Action::Unknown {
            event: event.clone(),
        }
    };

    let action = match (kind, op) {
        (kind, _) if IGNORED_TYPES.contains(&kind) => Action::Ignore { id },

        // -- Messages ----------------------------------------------------
        ("message", _) => new_message(snapshot, event, id)?,
        ("delete_message", _) => {
            let DeleteMessage {
                message_id,
                mut message_ids,
            } = parse(event, kind)?;
            message_ids.extend(message_id);
            Action::EventMessageDelete { id, message_ids }
        }
        ("update_message", _) => {
            let e: UpdateMessage = parse(event, kind)?;
            Action::EventUpdateMessage {
                id,
                message_id: e.message_id,
                content: e.rendered_content,
                topic: e.subject,
                edit_timestamp: e.edit_timestamp,
            }
        }
        ("update_message_flags", _) => {
            let e: UpdateMessageFlags = parse(event, kind)?;
            match op.or(e.operation.as_deref()).and_then(flag_operation) {
                Some(operation) => Action::EventUpdateMessageFlags {
                    id,
                    flag: e.flag,
                    operation,
                    all: e.all,
                    message_ids: e.messages,
                },
                None => unknown(),
            }
        }
        ("reaction", Some(op @ ("add" | "remove"))) => {
            let MessageRef { message_id } = parse(event, kind)?;
            let reaction = Reaction::try_from(parse::<WireReaction>(event, kind)?)?;
            if op == "add" {
                Action::EventReactionAdd {
                    id,
                    message_id,
                    reaction,
                }
            } else {
                Action::EventReactionRemove {
                    id,
                    message_id,
                    reaction,
                }
            }
        }

        // -- Presence and typing -----------------------------------------
        ("presence", _) => {
            let e: PresenceEvent = parse(event, kind)?;
            Action::EventPresence {
                id,
                email: e.email,
                server_timestamp: e.server_timestamp as i64,
                presence: e.presence,
            }
        }
        ("typing", Some(op @ ("start" | "stop"))) => {
            let e: TypingEvent = parse(event, kind)?;
            if e.message_type.as_deref() == Some("stream") {
                Action::Ignore { id }
            } else {
                let own_user_id = require_own_user(snapshot, "typing")?;
                let sender_id = e.sender.user_id;
                let recipient_ids = e.recipients.into_iter().map(|r| r.user_id).collect();
                if op == "start" {
                    Action::EventTypingStart {
                        id,
                        sender_id,
                        recipient_ids,
                        own_user_id,
                        time: now,
                    }
                } else {
                    Action::EventTypingStop {
                        id,
                        sender_id,
                        recipient_ids,
                        own_user_id,
                    }
                }
            }
        }

        // -- Users and groups ----------------------------------------------
        ("realm_user", Some("add")) => {
            let PersonEvent { person } = parse::<PersonEvent<User>>(event, kind)?;
            Action::EventUserAdd { id, person }
        }
        ("realm_user", Some("remove")) => {
            let PersonEvent { person } = parse::<PersonEvent<PersonRef>>(event, kind)?;
            Action::EventUserRemove {
                id,
                user_id: person.user_id,
            }
        }
        ("realm_user", Some("update")) => {
            let PersonEvent { person } = parse::<PersonEvent<PersonUpdate>>(event, kind)?;
            Action::EventUserUpdate {
                id,
                user_id: person.user_id,
                full_name: person.full_name,
                email: person.email,
                avatar_url: person.avatar_url,
                timezone: person.timezone,
            }
        }
        ("muted_topics", _) => {
            let MutedTopicsEvent { muted_topics } = parse(event, kind)?;
            Action::EventMutedTopics { id, muted_topics }
        }
        ("user_group", Some("add")) => {
            let GroupEvent { group } = parse(event, kind)?;
            Action::EventUserGroupAdd { id, group }
        }
        ("user_group", Some("remove")) => {
            let GroupRef { group_id } = parse(event, kind)?;
            Action::EventUserGroupRemove { id, group_id }
        }
        ("user_group", Some("update")) => {
            let GroupUpdate { group_id, data } = parse(event, kind)?;
            Action::EventUserGroupUpdate {
                id,
                group_id,
                name: data.name,
                description: data.description,
            }
        }
        ("user_group", Some("add_members")) => {
            let GroupMembers { group_id, user_ids } = parse(event, kind)?;
            Action::EventUserGroupAddMembers {
                id,
                group_id,
                user_ids,
            }
        }
        ("user_group", Some("remove_members")) => {
            let GroupMembers { group_id, user_ids } = parse(event, kind)?;
            Action::EventUserGroupRemoveMembers {
                id,
                group_id,
                user_ids,
            }
        }

        // -- Streams and subscriptions ---------------------------------------
        ("stream", Some("create")) => {
            let StreamsEvent { streams } = parse(event, kind)?;
            Action::EventStreamAdd { id, streams }
        }
        ("stream", Some("delete")) => {
            let StreamRefs { streams } = parse(event, kind)?;
            Action::EventStreamRemove {
                id,
                stream_ids: streams.into_iter().map(|s| s.stream_id).collect(),
            }
        }
        ("stream", Some("update")) => {
            let PropertyUpdate {
                stream_id,
                property,
                value,
            } = parse(event, kind)?;
            Action::EventStreamUpdate {
                id,
                stream_id,
                property,
                value,
            }
        }
        ("stream", Some("occupy")) => {
            let StreamsEvent { streams } = parse(event, kind)?;
            Action::EventStreamOccupy { id, streams }
        }
        ("stream", Some("vacate")) => Action::Ignore { id },
        ("subscription", Some("add")) => {
            let SubscriptionsEvent { subscriptions } = parse(event, kind)?;
            Action::EventSubscriptionAdd { id, subscriptions }
        }
        ("subscription", Some("remove")) => {
            let SubscriptionRefs { subscriptions } = parse(event, kind)?;
            Action::EventSubscriptionRemove {
                id,
                stream_ids: subscriptions.into_iter().map(|s| s.stream_id).collect(),
            }
        }
        ("subscription", Some("update")) => {
            let PropertyUpdate {
                stream_id,
                property,
                value,
            } = parse(event, kind)?;
            Action::EventSubscriptionUpdate {
                id,
                stream_id,
                property,
                value,
            }
        }
        ("subscription", Some(op @ ("peer_add" | "peer_remove"))) => {
            let e: PeerEvent = parse(event, kind)?;
            let user_id = e.user_id;
            let stream_ids = peer_stream_ids(snapshot, e);
            if op == "peer_add" {
                Action::EventSubscriptionPeerAdd {
                    id,
                    stream_ids,
                    user_id,
                }
            } else {
                Action::EventSubscriptionPeerRemove {
                    id,
                    stream_ids,
                    user_id,
                }
            }
        }

        // -- Realm -----------------------------------------------------------
        ("realm_emoji", Some("update")) => {
            let RealmEmojiEvent { realm_emoji } = parse(event, kind)?;
            Action::EventRealmEmojiUpdate { id, realm_emoji }
        }
        ("realm_filters", _) => {
            let RealmFiltersEvent { realm_filters } = parse(event, kind)?;
            Action::EventRealmFilters { id, realm_filters }
        }
        ("update_display_settings", _) => {
            let DisplaySettingsEvent {
                setting_name,
                setting,
            } = parse(event, kind)?;
            Action::EventUpdateDisplaySettings {
                id,
                setting_name,
                setting,
            }
        }
        ("update_global_notifications", _) => {
            let NotificationsEvent {
                notification_name,
                setting,
            } = parse(event, kind)?;
            Action::EventUpdateGlobalNotificationsSettings {
                id,
                notification_name,
                setting,
            }
        }

        _ => unknown(),
    };

    Ok(action)
}

fn new_message(snapshot: &Snapshot, event: &Value, id: EventId) -> Result<Action> {
    let own_user_id = require_own_user(snapshot, "message")?;
    let MessageEvent {
        message,
        flags,
        local_message_id,
    } = parse(event, "message")?;

    let mut message = Message::try_from(message)?;
    message.flags.extend(flags);
    if message.sender_id == own_user_id {
        message.flags.insert(FLAG_READ.to_string());
    }

    Ok(Action::EventNewMessage {
        id,
        message: Box::new(message),
        local_message_id: local_message_id.as_ref().and_then(parse_local_id),
        own_user_id,
    })
}

fn peer_stream_ids(snapshot: &Snapshot, event: PeerEvent) -> Vec<StreamId> {
    let mut ids = event.stream_ids;
    ids.extend(event.stream_id);
    for name in &event.subscriptions {
        match snapshot.streams.values().find(|s| s.name == *name) {
            Some(stream) => ids.push(stream.stream_id),
            None => tracing::debug!(stream = %name, "peer event names an unknown stream"),
        }
    }
    ids
}
