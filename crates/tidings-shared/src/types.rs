use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

integer_id!(
    /// Server-assigned user id.
    UserId
);
integer_id!(
    /// Server-assigned message id. Unique across the realm.
    MessageId
);
integer_id!(
    /// Stable stream id; the name of a stream can change, the id cannot.
    StreamId
);
integer_id!(
    /// User group id.
    GroupId
);
integer_id!(
    /// Client-generated id of an outbox entry. Never compared to a [`MessageId`].
    LocalMessageId
);

/// Event id assigned by the server's event queue. `-1` is used by the server
/// for the synthetic events of a fresh queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Participant sets
// ---------------------------------------------------------------------------

/// Sort and de-duplicate a list of user ids.
pub fn normalize_user_ids<I>(ids: I) -> Vec<UserId>
where
    I: IntoIterator<Item = UserId>,
{
    ids.into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Canonical participant list of a group conversation: the user ids sorted,
/// de-duplicated, in ASCII decimal, comma-separated (`"1,2,3"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PmUsers(String);

impl PmUsers {
    pub fn from_ids<I>(ids: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = UserId>,
    {
        let ids = normalize_user_ids(ids);
        if ids.is_empty() {
            return Err(TypeError::EmptyParticipants);
        }
        let joined = ids
            .iter()
            .map(|id| id.0.to_string())
            .collect::<Vec<_>>()
            .join(",");
        Ok(Self(joined))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn user_ids(&self) -> Vec<UserId> {
        // The inner string is only ever built by `from_ids`.
        self.0
            .split(',')
            .filter_map(|s| s.parse::<u64>().ok())
            .map(UserId)
            .collect()
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.user_ids().contains(&user_id)
    }
}

impl FromStr for PmUsers {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ids = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let id = part
                .parse::<u64>()
                .map_err(|_| TypeError::InvalidUserId(part.to_string()))?;
            ids.push(UserId(id));
        }
        Self::from_ids(ids)
    }
}

impl TryFrom<String> for PmUsers {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PmUsers> for String {
    fn from(value: PmUsers) -> Self {
        value.0
    }
}

impl fmt::Display for PmUsers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Where a message was sent.
///
/// Used to classify inbound payloads and to compute the identity of a
/// conversation. Equality is structural: two `GroupDirect` values built from
/// `[2, 1, 3]` and `[1, 2, 3]` are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recipient {
    /// A 1:1 private message. It was sent to this user, so nothing more to say.
    Direct,
    /// A group private message among `pm_users` (the own user included).
    GroupDirect { pm_users: PmUsers },
    /// A stream message.
    Stream { stream: String, topic: String },
}

impl Recipient {
    pub fn group_direct<I>(ids: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = UserId>,
    {
        Ok(Self::GroupDirect {
            pm_users: PmUsers::from_ids(ids)?,
        })
    }

    pub fn stream(stream: impl Into<String>, topic: impl Into<String>) -> Self {
        Self::Stream {
            stream: stream.into(),
            topic: topic.into(),
        }
    }

    /// Classify a private conversation by its full participant list: two or
    /// fewer participants is a 1:1 conversation.
    pub fn from_participants<I>(ids: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = UserId>,
    {
        let ids = normalize_user_ids(ids);
        match ids.len() {
            0 => Err(TypeError::EmptyParticipants),
            1 | 2 => Ok(Self::Direct),
            _ => Self::group_direct(ids),
        }
    }

    pub fn is_private(&self) -> bool {
        !matches!(self, Self::Stream { .. })
    }
}

// ---------------------------------------------------------------------------
// Conversation key
// ---------------------------------------------------------------------------

/// Canonical identity of a conversation, used to key drafts and typing
/// indicators. Different raw descriptions of the same conversation produce
/// the same key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationKey(String);

impl ConversationKey {
    pub fn stream(stream: &str) -> Self {
        Self(format!("stream:{stream}"))
    }

    /// Topic names are case-insensitive, so the key carries them lowercased.
    pub fn topic(stream: &str, topic: &str) -> Self {
        Self(format!("topic:{stream}\n{}", topic.to_lowercase()))
    }

    /// Key of a private conversation. `user_ids` are the participants other
    /// than the own user; callers pass the own id alone for a self-conversation.
    pub fn private<I>(user_ids: I) -> Self
    where
        I: IntoIterator<Item = UserId>,
    {
        let ids = normalize_user_ids(user_ids)
            .iter()
            .map(|id| id.0.to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self(format!("pm:{ids}"))
    }

    /// Key of the conversation a recipient descriptor points at, as seen by
    /// `own_user_id` when the message came from `sender_id`.
    pub fn from_recipient(recipient: &Recipient, sender_id: UserId, own_user_id: UserId) -> Self {
        match recipient {
            Recipient::Stream { stream, topic } => Self::topic(stream, topic),
            Recipient::GroupDirect { pm_users } => Self::private(
                pm_users
                    .user_ids()
                    .into_iter()
                    .filter(|id| *id != own_user_id),
            ),
            Recipient::Direct => Self::private([sender_id]),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
