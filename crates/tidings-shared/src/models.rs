//! Domain models mirrored from the server.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be persisted
//! as part of a state slice and restored by the rehydration gate. Fields added
//! after the first release carry `#[serde(default)]`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::FLAG_READ;
use crate::error::ProtocolError;
use crate::narrow::Narrow;
use crate::types::{
    ConversationKey, GroupId, LocalMessageId, MessageId, Recipient, StreamId, UserId,
};

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Where a message or outbox entry is addressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Destination {
    Stream {
        stream_id: StreamId,
        stream: String,
        topic: String,
    },
    /// All participants, sender and own user included, sorted.
    Private { participants: Vec<UserId> },
}

impl Destination {
    pub fn recipient(&self) -> Recipient {
        match self {
            Self::Stream { stream, topic, .. } => Recipient::stream(stream.clone(), topic.clone()),
            Self::Private { participants } => {
                Recipient::from_participants(participants.iter().copied())
                    .unwrap_or(Recipient::Direct)
            }
        }
    }

    /// Participants other than `own_user_id`; the own id alone for a
    /// conversation with oneself.
    pub fn other_participants(&self, own_user_id: UserId) -> Option<Vec<UserId>> {
        match self {
            Self::Stream { .. } => None,
            Self::Private { participants } => {
                let others: Vec<UserId> = participants
                    .iter()
                    .copied()
                    .filter(|id| *id != own_user_id)
                    .collect();
                if others.is_empty() {
                    Some(vec![own_user_id])
                } else {
                    Some(others)
                }
            }
        }
    }

    pub fn conversation_key(&self, own_user_id: UserId) -> ConversationKey {
        match self {
            Self::Stream { stream, topic, .. } => ConversationKey::topic(stream, topic),
            Self::Private { .. } => ConversationKey::private(
                self.other_participants(own_user_id).unwrap_or_default(),
            ),
        }
    }
}

/// A message as held in the messages slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub sender_email: String,
    pub sender_full_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub destination: Destination,
    /// Rendered content as sent by the server.
    pub content: String,
    /// Unix seconds.
    pub timestamp: i64,
    #[serde(default)]
    pub last_edit_timestamp: Option<i64>,
    #[serde(default)]
    pub flags: BTreeSet<String>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

impl Message {
    pub fn recipient(&self) -> Recipient {
        self.destination.recipient()
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_read(&self) -> bool {
        self.has_flag(FLAG_READ)
    }

    pub fn is_private(&self) -> bool {
        matches!(self.destination, Destination::Private { .. })
    }

    pub fn stream_and_topic(&self) -> Option<(&str, &str)> {
        match &self.destination {
            Destination::Stream { stream, topic, .. } => Some((stream, topic)),
            Destination::Private { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Reaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionType {
    UnicodeEmoji,
    RealmEmoji,
    ZulipExtraEmoji,
}

/// One user's emoji reaction on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub user_id: UserId,
    pub emoji_name: String,
    pub emoji_code: String,
    pub reaction_type: ReactionType,
}

impl Reaction {
    /// Same user, same emoji. The display name is not part of the identity.
    pub fn same_as(&self, other: &Reaction) -> bool {
        self.user_id == other.user_id
            && self.emoji_code == other.emoji_code
            && self.reaction_type == other.reaction_type
    }
}

// ---------------------------------------------------------------------------
// Streams and subscriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    pub stream_id: StreamId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub invite_only: bool,
}

impl Stream {
    /// Apply a `stream/update` property change. Returns `false` when the
    /// property is unknown, the value has the wrong type, or nothing changed.
    pub fn set_property(&mut self, property: &str, value: &Value) -> bool {
        match property {
            "name" => set_string(&mut self.name, value),
            "description" => set_string(&mut self.description, value),
            "invite_only" => set_bool(&mut self.invite_only, value),
            _ => false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A stream plus the own user's per-stream settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub stream_id: StreamId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub invite_only: bool,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_true")]
    pub in_home_view: bool,
    #[serde(default)]
    pub pin_to_top: bool,
    #[serde(default)]
    pub audible_notifications: bool,
    #[serde(default)]
    pub desktop_notifications: bool,
    #[serde(default)]
    pub push_notifications: bool,
    #[serde(default)]
    pub subscribers: BTreeSet<UserId>,
}

impl Subscription {
    /// Apply a `subscription/update` property change.
    pub fn set_property(&mut self, property: &str, value: &Value) -> bool {
        match property {
            "name" => set_string(&mut self.name, value),
            "description" => set_string(&mut self.description, value),
            "color" => set_string(&mut self.color, value),
            "in_home_view" => set_bool(&mut self.in_home_view, value),
            "is_muted" => match value.as_bool() {
                Some(muted) if self.in_home_view == muted => {
                    self.in_home_view = !muted;
                    true
                }
                _ => false,
            },
            "pin_to_top" => set_bool(&mut self.pin_to_top, value),
            "audible_notifications" => set_bool(&mut self.audible_notifications, value),
            "desktop_notifications" => set_bool(&mut self.desktop_notifications, value),
            "push_notifications" => set_bool(&mut self.push_notifications, value),
            _ => false,
        }
    }
}

fn set_string(field: &mut String, value: &Value) -> bool {
    match value.as_str() {
        Some(s) if s != field.as_str() => {
            *field = s.to_string();
            true
        }
        _ => false,
    }
}

fn set_bool(field: &mut bool, value: &Value) -> bool {
    match value.as_bool() {
        Some(b) if b != *field => {
            *field = b;
            true
        }
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub max_id: MessageId,
}

/// A (stream, topic) pair the user has muted.
///
/// On the wire this is an array `[stream, topic]`, optionally followed by a
/// mute timestamp which is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Value>", into = "(String, String)")]
pub struct MutedTopic {
    pub stream: String,
    pub topic: String,
}

impl TryFrom<Vec<Value>> for MutedTopic {
    type Error = ProtocolError;

    fn try_from(value: Vec<Value>) -> Result<Self, Self::Error> {
        match value.as_slice() {
            [Value::String(stream), Value::String(topic), ..] => Ok(Self {
                stream: stream.clone(),
                topic: topic.clone(),
            }),
            _ => Err(ProtocolError::InvalidMutedTopic),
        }
    }
}

impl From<MutedTopic> for (String, String) {
    fn from(value: MutedTopic) -> Self {
        (value.stream, value.topic)
    }
}

// ---------------------------------------------------------------------------
// Users and groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// A set, so a member can never be listed twice.
    #[serde(default)]
    pub members: BTreeSet<UserId>,
}

// ---------------------------------------------------------------------------
// Realm
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealmEmoji {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub source_url: String,
    #[serde(default)]
    pub deactivated: bool,
}

/// A linkifier: `(pattern, url_format, id)`, an array on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealmFilter(pub String, pub String, pub u64);

impl RealmFilter {
    pub fn pattern(&self) -> &str {
        &self.0
    }

    pub fn url_format(&self) -> &str {
        &self.1
    }

    pub fn id(&self) -> u64 {
        self.2
    }
}

// ---------------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    Active,
    Idle,
    Offline,
}

/// One client's last presence report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPresence {
    pub status: PresenceStatus,
    /// Unix seconds.
    pub timestamp: i64,
}

/// Presence reports of one user, keyed by client name (`website`, `ZulipMobile`...).
pub type UserPresence = BTreeMap<String, ClientPresence>;

// ---------------------------------------------------------------------------
// Outbox
// ---------------------------------------------------------------------------

/// A locally composed message awaiting server confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outbox {
    pub local_message_id: LocalMessageId,
    pub sender_id: UserId,
    pub sender_email: String,
    pub sender_full_name: String,
    pub destination: Destination,
    /// The narrow the message was composed in.
    pub narrow: Narrow,
    /// Markdown source as typed.
    pub content: String,
    /// Unix seconds.
    pub timestamp: i64,
    #[serde(default)]
    pub failed: bool,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// The (realm, email) pair identifying a login.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub realm: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub realm: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub zulip_version: Option<String>,
    #[serde(default)]
    pub acked_push_token: Option<String>,
}

impl Account {
    pub fn new(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            email: String::new(),
            api_key: String::new(),
            user_id: None,
            zulip_version: None,
            acked_push_token: None,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            realm: self.realm.clone(),
            email: self.email.clone(),
        }
    }

    pub fn has_auth(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_recipient() {
        let group = Destination::Private {
            participants: vec![UserId(1), UserId(2), UserId(3)],
        };
        assert_eq!(
            group.recipient(),
            Recipient::group_direct([UserId(3), UserId(2), UserId(1)]).unwrap()
        );

        let direct = Destination::Private {
            participants: vec![UserId(1), UserId(2)],
        };
        assert_eq!(direct.recipient(), Recipient::Direct);
        assert_eq!(direct.other_participants(UserId(1)), Some(vec![UserId(2)]));

        let own = Destination::Private {
            participants: vec![UserId(1)],
        };
        assert_eq!(own.other_participants(UserId(1)), Some(vec![UserId(1)]));
    }

    #[test]
    fn test_subscription_set_property() {
        let mut sub: Subscription =
            serde_json::from_str(r#"{"stream_id": 4, "name": "general"}"#).unwrap();
        assert!(sub.in_home_view);

        assert!(sub.set_property("is_muted", &Value::Bool(true)));
        assert!(!sub.in_home_view);
        assert!(!sub.set_property("is_muted", &Value::Bool(true)));

        assert!(sub.set_property("color", &Value::String("#c2c2c2".into())));
        assert!(!sub.set_property("color", &Value::Bool(true)));
        assert!(!sub.set_property("no_such_property", &Value::Bool(true)));
    }

    #[test]
    fn test_muted_topic_wire_format() {
        let topics: Vec<MutedTopic> =
            serde_json::from_str(r#"[["general", "lunch"], ["dev", "ci", 1577836800]]"#).unwrap();
        assert_eq!(topics[1].topic, "ci");

        let back = serde_json::to_value(&topics[0]).unwrap();
        assert_eq!(back, serde_json::json!(["general", "lunch"]));

        assert!(serde_json::from_str::<MutedTopic>(r#"["only-stream"]"#).is_err());
    }

    #[test]
    fn test_realm_filter_from_array() {
        let filter: RealmFilter = serde_json::from_str(
            r##"["#(?P<id>[0-9]+)", "https://github.com/zulip/zulip/issues/%(id)s", 2]"##,
        )
        .unwrap();
        assert_eq!(filter.id(), 2);
        assert!(filter.url_format().starts_with("https://"));
    }
}
