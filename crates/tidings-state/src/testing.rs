//! Fixtures shared by the unit tests of this crate.

use std::collections::BTreeSet;

use tidings_shared::models::{
    Destination, Message, Outbox, Reaction, ReactionType, Stream, Subscription, User, UserGroup,
};
use tidings_shared::narrow::Narrow;
use tidings_shared::types::{EventId, GroupId, LocalMessageId, MessageId, StreamId, UserId};

pub const OWN_USER: UserId = UserId(1);

pub fn eid() -> EventId {
    EventId(42)
}

pub fn stream_message(id: u64, stream: &str, topic: &str) -> Message {
    Message {
        id: MessageId(id),
        sender_id: UserId(2),
        sender_email: "iago@example.com".to_string(),
        sender_full_name: "Iago".to_string(),
        avatar_url: None,
        destination: Destination::Stream {
            stream_id: StreamId(10),
            stream: stream.to_string(),
            topic: topic.to_string(),
        },
        content: format!("<p>message {id}</p>"),
        timestamp: 1_600_000_000 + id as i64,
        last_edit_timestamp: None,
        flags: BTreeSet::new(),
        reactions: Vec::new(),
    }
}

pub fn private_message(id: u64, participants: &[u64]) -> Message {
    Message {
        destination: Destination::Private {
            participants: participants.iter().copied().map(UserId).collect(),
        },
        ..stream_message(id, "", "")
    }
}

pub fn reaction(user: u64, code: &str) -> Reaction {
    Reaction {
        user_id: UserId(user),
        emoji_name: format!("name-{code}"),
        emoji_code: code.to_string(),
        reaction_type: ReactionType::UnicodeEmoji,
    }
}

pub fn stream(id: u64, name: &str) -> Stream {
    Stream {
        stream_id: StreamId(id),
        name: name.to_string(),
        description: String::new(),
        invite_only: false,
    }
}

pub fn subscription(id: u64, name: &str) -> Subscription {
    Subscription {
        stream_id: StreamId(id),
        name: name.to_string(),
        description: String::new(),
        invite_only: false,
        color: "#76ce90".to_string(),
        in_home_view: true,
        pin_to_top: false,
        audible_notifications: false,
        desktop_notifications: false,
        push_notifications: false,
        subscribers: BTreeSet::new(),
    }
}

pub fn user(id: u64, name: &str) -> User {
    User {
        user_id: UserId(id),
        email: format!("{}@example.com", name.to_lowercase()),
        full_name: name.to_string(),
        avatar_url: None,
        is_bot: false,
        is_admin: false,
        timezone: String::new(),
    }
}

pub fn group(id: u64, name: &str, members: &[u64]) -> UserGroup {
    UserGroup {
        id: GroupId(id),
        name: name.to_string(),
        description: String::new(),
        members: members.iter().copied().map(UserId).collect(),
    }
}

pub fn outbox(local_id: u64, stream: &str, topic: &str) -> Outbox {
    Outbox {
        local_message_id: LocalMessageId(local_id),
        sender_id: OWN_USER,
        sender_email: "me@example.com".to_string(),
        sender_full_name: "Me".to_string(),
        destination: Destination::Stream {
            stream_id: StreamId(10),
            stream: stream.to_string(),
            topic: topic.to_string(),
        },
        narrow: Narrow::topic(stream, topic),
        content: format!("outbox {local_id}"),
        timestamp: 1_600_000_000,
        failed: false,
    }
}
