//! Server payload shapes and their conversion into domain models.
//!
//! These mirror what the server sends (in messages fetches, `message` events
//! and the register response). They are only ever deserialized; the state
//! slices hold the normalized models from [`crate::models`].

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ProtocolError;
use crate::models::{
    Destination, Message, MutedTopic, Reaction, ReactionType, RealmEmoji, RealmFilter, Stream,
    Subscription, User, UserGroup,
};
use crate::types::{normalize_user_ids, MessageId, StreamId, UserId};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct WireRecipientUser {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireReactionUser {
    #[serde(alias = "id")]
    pub user_id: UserId,
}

/// A reaction as sent by the server. Older servers nest the reacting user in
/// a `user` object instead of sending `user_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct WireReaction {
    pub emoji_name: String,
    pub emoji_code: String,
    pub reaction_type: ReactionType,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub user: Option<WireReactionUser>,
}

impl TryFrom<WireReaction> for Reaction {
    type Error = ProtocolError;

    fn try_from(wire: WireReaction) -> Result<Self, Self::Error> {
        let user_id = wire
            .user_id
            .or(wire.user.map(|u| u.user_id))
            .ok_or(ProtocolError::MissingReactionUser)?;
        Ok(Reaction {
            user_id,
            emoji_name: wire.emoji_name,
            emoji_code: wire.emoji_code,
            reaction_type: wire.reaction_type,
        })
    }
}

/// A message as sent by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    pub id: MessageId,
    pub sender_id: UserId,
    pub sender_email: String,
    pub sender_full_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(rename = "type")]
    pub message_type: String,
    /// Stream name for stream messages, list of users for private ones.
    pub display_recipient: Value,
    #[serde(default)]
    pub stream_id: Option<StreamId>,
    #[serde(default)]
    pub subject: String,
    pub content: String,
    pub timestamp: i64,
    #[serde(default)]
    pub last_edit_timestamp: Option<i64>,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub reactions: Vec<WireReaction>,
}

impl TryFrom<WireMessage> for Message {
    type Error = ProtocolError;

    fn try_from(wire: WireMessage) -> Result<Self, Self::Error> {
        let destination = match wire.message_type.as_str() {
            "stream" => {
                let stream = wire
                    .display_recipient
                    .as_str()
                    .ok_or(ProtocolError::InvalidDisplayRecipient(
                        "expected a stream name",
                    ))?
                    .to_string();
                Destination::Stream {
                    stream_id: wire.stream_id.ok_or(ProtocolError::MissingStreamId)?,
                    stream,
                    topic: wire.subject,
                }
            }
            "private" => {
                let users: Vec<WireRecipientUser> =
                    serde_json::from_value(wire.display_recipient).map_err(|_| {
                        ProtocolError::InvalidDisplayRecipient("expected a list of users")
                    })?;
                let participants = normalize_user_ids(
                    users
                        .into_iter()
                        .map(|u| u.id)
                        .chain(std::iter::once(wire.sender_id)),
                );
                Destination::Private { participants }
            }
            other => return Err(ProtocolError::UnknownMessageType(other.to_string())),
        };

        let reactions = wire
            .reactions
            .into_iter()
            .map(Reaction::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Message {
            id: wire.id,
            sender_id: wire.sender_id,
            sender_email: wire.sender_email,
            sender_full_name: wire.sender_full_name,
            avatar_url: wire.avatar_url,
            destination,
            content: wire.content,
            timestamp: wire.timestamp,
            last_edit_timestamp: wire.last_edit_timestamp,
            flags: wire.flags.into_iter().collect(),
            reactions,
        })
    }
}

// ---------------------------------------------------------------------------
// Register response
// ---------------------------------------------------------------------------

fn default_last_event_id() -> i64 {
    -1
}

/// The subset of the register response the state core consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InitialData {
    #[serde(default)]
    pub queue_id: Option<String>,
    #[serde(default = "default_last_event_id")]
    pub last_event_id: i64,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub zulip_version: Option<String>,
    #[serde(default)]
    pub realm_name: String,
    #[serde(default)]
    pub realm_icon_url: String,
    #[serde(default)]
    pub realm_users: Vec<User>,
    #[serde(default)]
    pub realm_user_groups: Vec<UserGroup>,
    #[serde(default)]
    pub streams: Vec<Stream>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub muted_topics: Vec<MutedTopic>,
    #[serde(default)]
    pub realm_emoji: BTreeMap<String, RealmEmoji>,
    #[serde(default)]
    pub realm_filters: Vec<RealmFilter>,
    #[serde(default)]
    pub twenty_four_hour_time: bool,
    #[serde(default)]
    pub can_create_streams: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub enable_offline_push_notifications: bool,
    #[serde(default)]
    pub enable_online_push_notifications: bool,
    #[serde(default)]
    pub enable_stream_push_notifications: bool,
}
