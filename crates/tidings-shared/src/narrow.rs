//! Narrows: which subset of the conversation the user is looking at.

use serde::{Deserialize, Serialize};

use crate::types::{normalize_user_ids, ConversationKey, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Narrow {
    /// Every message.
    Home,
    /// All topics of one stream.
    Stream { stream: String },
    /// One topic of one stream.
    Topic { stream: String, topic: String },
    /// A private conversation with `user_ids` (the own user excluded, except
    /// for a conversation with oneself). The list may be unsorted.
    Private { user_ids: Vec<UserId> },
    Starred,
    Mentioned,
    AllPrivate,
    Search { query: String },
}

impl Narrow {
    pub fn stream(stream: impl Into<String>) -> Self {
        Self::Stream {
            stream: stream.into(),
        }
    }

    pub fn topic(stream: impl Into<String>, topic: impl Into<String>) -> Self {
        Self::Topic {
            stream: stream.into(),
            topic: topic.into(),
        }
    }

    pub fn private<I>(user_ids: I) -> Self
    where
        I: IntoIterator<Item = UserId>,
    {
        Self::Private {
            user_ids: user_ids.into_iter().collect(),
        }
    }

    /// Canonical string form, stable across equivalent raw narrows.
    pub fn key(&self) -> String {
        match self {
            Self::Home => "home".to_string(),
            Self::Stream { stream } => format!("stream:{stream}"),
            Self::Topic { stream, topic } => {
                format!("topic:{stream}\n{}", topic.to_lowercase())
            }
            Self::Private { user_ids } => {
                let ids = normalize_user_ids(user_ids.iter().copied())
                    .iter()
                    .map(|id| id.0.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("pm:{ids}")
            }
            Self::Starred => "starred".to_string(),
            Self::Mentioned => "mentioned".to_string(),
            Self::AllPrivate => "all-private".to_string(),
            Self::Search { query } => format!("search:{query}"),
        }
    }

    /// The conversation a message composed in this narrow belongs to.
    /// `None` for narrows that span several conversations.
    pub fn conversation_key(&self) -> Option<ConversationKey> {
        match self {
            Self::Stream { stream } => Some(ConversationKey::stream(stream)),
            Self::Topic { stream, topic } => Some(ConversationKey::topic(stream, topic)),
            Self::Private { user_ids } if !user_ids.is_empty() => {
                Some(ConversationKey::private(user_ids.iter().copied()))
            }
            _ => None,
        }
    }

    pub fn stream_name(&self) -> Option<&str> {
        match self {
            Self::Stream { stream } | Self::Topic { stream, .. } => Some(stream),
            _ => None,
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, Self::Private { .. } | Self::AllPrivate)
    }
}
