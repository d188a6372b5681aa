//! The closed set of state transitions.
//!
//! Server events are translated into `Event*` variants (carrying the event
//! queue's id) by the transport layer; everything else is dispatched locally.
//! Context a reducer needs from elsewhere in the state, such as the own user
//! id, is captured into the action when it is built.

use std::collections::BTreeMap;

use serde_json::Value;
use tidings_shared::models::{
    Identity, Message, MutedTopic, Outbox, Reaction, RealmEmoji, RealmFilter, Stream,
    Subscription, Topic, User, UserGroup, UserPresence,
};
use tidings_shared::narrow::Narrow;
use tidings_shared::protocol::InitialData;
use tidings_shared::types::{
    ConversationKey, EventId, GroupId, LocalMessageId, MessageId, StreamId, UserId,
};

use crate::reducers::settings::SettingsUpdate;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOperation {
    Add,
    Remove,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // -- Lifecycle ---------------------------------------------------------
    /// The persisted state, already passed through the rehydration gate.
    Rehydrate(Box<Snapshot>),
    AppOnline {
        is_online: bool,
    },
    AppState {
        is_active: bool,
    },
    /// The server forgot our event queue; everything must be refetched.
    DeadQueue,
    InitialFetchStart,
    InitialFetchComplete,
    RegisterComplete(Box<InitialData>),
    DoNarrow {
        narrow: Narrow,
    },
    StartEditMessage {
        message_id: MessageId,
        content: String,
        topic: String,
    },
    CancelEditMessage,
    SettingsChange(SettingsUpdate),

    // -- Accounts ----------------------------------------------------------
    AccountSwitch {
        index: usize,
    },
    RealmAdd {
        realm: String,
        zulip_version: Option<String>,
    },
    AccountRemove {
        index: usize,
    },
    LoginSuccess {
        realm: String,
        email: String,
        api_key: String,
    },
    Logout,
    GotPushToken {
        push_token: String,
    },
    AckPushToken {
        identity: Identity,
        push_token: String,
    },
    UnackPushToken {
        identity: Identity,
    },

    // -- Message fetching ----------------------------------------------------
    MessageFetchStart {
        narrow: Narrow,
        num_before: u32,
        num_after: u32,
    },
    MessageFetchComplete {
        narrow: Narrow,
        messages: Vec<Message>,
        anchor: Option<MessageId>,
        num_before: u32,
        num_after: u32,
        found_oldest: bool,
        found_newest: bool,
    },
    MessageFetchFailed {
        narrow: Narrow,
    },
    MarkMessagesRead {
        message_ids: Vec<MessageId>,
    },

    // -- Outbox and drafts ---------------------------------------------------
    MessageSendStart(Box<Outbox>),
    MessageSendComplete {
        local_message_id: LocalMessageId,
    },
    MessageSendFailed {
        local_message_id: LocalMessageId,
    },
    DeleteOutboxMessage {
        local_message_id: LocalMessageId,
    },
    ToggleOutboxSending {
        sending: bool,
    },
    DraftUpdate {
        narrow: Narrow,
        content: String,
    },

    // -- Bulk loads ----------------------------------------------------------
    InitStreams {
        streams: Vec<Stream>,
    },
    InitSubscriptions {
        subscriptions: Vec<Subscription>,
    },
    InitTopics {
        stream_id: StreamId,
        topics: Vec<Topic>,
    },
    InitRealmEmoji {
        emoji: BTreeMap<String, RealmEmoji>,
    },
    InitRealmFilters {
        filters: Vec<RealmFilter>,
    },
    PresenceResponse {
        presence: BTreeMap<String, UserPresence>,
        server_timestamp: i64,
    },
    ClearTyping {
        outdated: Vec<ConversationKey>,
    },

    // -- Server events -------------------------------------------------------
    EventNewMessage {
        id: EventId,
        message: Box<Message>,
        /// Set when the message echoes one of our outbox entries.
        local_message_id: Option<LocalMessageId>,
        own_user_id: UserId,
    },
    EventMessageDelete {
        id: EventId,
        message_ids: Vec<MessageId>,
    },
    EventUpdateMessage {
        id: EventId,
        message_id: MessageId,
        content: Option<String>,
        topic: Option<String>,
        edit_timestamp: Option<i64>,
    },
    EventUpdateMessageFlags {
        id: EventId,
        flag: String,
        operation: FlagOperation,
        all: bool,
        message_ids: Vec<MessageId>,
    },
    EventReactionAdd {
        id: EventId,
        message_id: MessageId,
        reaction: Reaction,
    },
    EventReactionRemove {
        id: EventId,
        message_id: MessageId,
        reaction: Reaction,
    },
    EventPresence {
        id: EventId,
        email: String,
        server_timestamp: i64,
        presence: UserPresence,
    },
    EventTypingStart {
        id: EventId,
        sender_id: UserId,
        recipient_ids: Vec<UserId>,
        own_user_id: UserId,
        time: i64,
    },
    EventTypingStop {
        id: EventId,
        sender_id: UserId,
        recipient_ids: Vec<UserId>,
        own_user_id: UserId,
    },
    EventUserAdd {
        id: EventId,
        person: User,
    },
    EventUserRemove {
        id: EventId,
        user_id: UserId,
    },
    EventUserUpdate {
        id: EventId,
        user_id: UserId,
        full_name: Option<String>,
        email: Option<String>,
        avatar_url: Option<String>,
        timezone: Option<String>,
    },
    EventMutedTopics {
        id: EventId,
        muted_topics: Vec<MutedTopic>,
    },
    EventUserGroupAdd {
        id: EventId,
        group: UserGroup,
    },
    EventUserGroupRemove {
        id: EventId,
        group_id: GroupId,
    },
    EventUserGroupUpdate {
        id: EventId,
        group_id: GroupId,
        name: Option<String>,
        description: Option<String>,
    },
    EventUserGroupAddMembers {
        id: EventId,
        group_id: GroupId,
        user_ids: Vec<UserId>,
    },
    EventUserGroupRemoveMembers {
        id: EventId,
        group_id: GroupId,
        user_ids: Vec<UserId>,
    },
    EventStreamAdd {
        id: EventId,
        streams: Vec<Stream>,
    },
    EventStreamRemove {
        id: EventId,
        stream_ids: Vec<StreamId>,
    },
    EventStreamUpdate {
        id: EventId,
        stream_id: StreamId,
        property: String,
        value: Value,
    },
    EventStreamOccupy {
        id: EventId,
        streams: Vec<Stream>,
    },
    EventSubscriptionAdd {
        id: EventId,
        subscriptions: Vec<Subscription>,
    },
    EventSubscriptionRemove {
        id: EventId,
        stream_ids: Vec<StreamId>,
    },
    EventSubscriptionUpdate {
        id: EventId,
        stream_id: StreamId,
        property: String,
        value: Value,
    },
    EventSubscriptionPeerAdd {
        id: EventId,
        stream_ids: Vec<StreamId>,
        user_id: UserId,
    },
    EventSubscriptionPeerRemove {
        id: EventId,
        stream_ids: Vec<StreamId>,
        user_id: UserId,
    },
    EventRealmEmojiUpdate {
        id: EventId,
        realm_emoji: BTreeMap<String, RealmEmoji>,
    },
    EventRealmFilters {
        id: EventId,
        realm_filters: Vec<RealmFilter>,
    },
    EventUpdateDisplaySettings {
        id: EventId,
        setting_name: String,
        setting: Value,
    },
    EventUpdateGlobalNotificationsSettings {
        id: EventId,
        notification_name: String,
        setting: bool,
    },
    /// A well-formed event of a kind the state does not track.
    Ignore {
        id: EventId,
    },
    /// An event whose `type`, or `op` within a known type, is not recognized.
    Unknown {
        event: Value,
    },
}

impl Action {
    /// Stable name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Rehydrate(_) => "rehydrate",
            Action::AppOnline { .. } => "app_online",
            Action::AppState { .. } => "app_state",
            Action::DeadQueue => "dead_queue",
            Action::InitialFetchStart => "initial_fetch_start",
            Action::InitialFetchComplete => "initial_fetch_complete",
            Action::RegisterComplete(_) => "register_complete",
            Action::DoNarrow { .. } => "do_narrow",
            Action::StartEditMessage { .. } => "start_edit_message",
            Action::CancelEditMessage => "cancel_edit_message",
            Action::SettingsChange(_) => "settings_change",
            Action::AccountSwitch { .. } => "account_switch",
            Action::RealmAdd { .. } => "realm_add",
            Action::AccountRemove { .. } => "account_remove",
            Action::LoginSuccess { .. } => "login_success",
            Action::Logout => "logout",
            Action::GotPushToken { .. } => "got_push_token",
            Action::AckPushToken { .. } => "ack_push_token",
            Action::UnackPushToken { .. } => "unack_push_token",
            Action::MessageFetchStart { .. } => "message_fetch_start",
            Action::MessageFetchComplete { .. } => "message_fetch_complete",
            Action::MessageFetchFailed { .. } => "message_fetch_failed",
            Action::MarkMessagesRead { .. } => "mark_messages_read",
            Action::MessageSendStart(_) => "message_send_start",
            Action::MessageSendComplete { .. } => "message_send_complete",
            Action::MessageSendFailed { .. } => "message_send_failed",
            Action::DeleteOutboxMessage { .. } => "delete_outbox_message",
            Action::ToggleOutboxSending { .. } => "toggle_outbox_sending",
            Action::DraftUpdate { .. } => "draft_update",
            Action::InitStreams { .. } => "init_streams",
            Action::InitSubscriptions { .. } => "init_subscriptions",
            Action::InitTopics { .. } => "init_topics",
            Action::InitRealmEmoji { .. } => "init_realm_emoji",
            Action::InitRealmFilters { .. } => "init_realm_filters",
            Action::PresenceResponse { .. } => "presence_response",
            Action::ClearTyping { .. } => "clear_typing",
            Action::EventNewMessage { .. } => "event_new_message",
            Action::EventMessageDelete { .. } => "event_message_delete",
            Action::EventUpdateMessage { .. } => "event_update_message",
            Action::EventUpdateMessageFlags { .. } => "event_update_message_flags",
            Action::EventReactionAdd { .. } => "event_reaction_add",
            Action::EventReactionRemove { .. } => "event_reaction_remove",
            Action::EventPresence { .. } => "event_presence",
            Action::EventTypingStart { .. } => "event_typing_start",
            Action::EventTypingStop { .. } => "event_typing_stop",
            Action::EventUserAdd { .. } => "event_user_add",
            Action::EventUserRemove { .. } => "event_user_remove",
            Action::EventUserUpdate { .. } => "event_user_update",
            Action::EventMutedTopics { .. } => "event_muted_topics",
            Action::EventUserGroupAdd { .. } => "event_user_group_add",
            Action::EventUserGroupRemove { .. } => "event_user_group_remove",
            Action::EventUserGroupUpdate { .. } => "event_user_group_update",
            Action::EventUserGroupAddMembers { .. } => "event_user_group_add_members",
            Action::EventUserGroupRemoveMembers { .. } => "event_user_group_remove_members",
            Action::EventStreamAdd { .. } => "event_stream_add",
            Action::EventStreamRemove { .. } => "event_stream_remove",
            Action::EventStreamUpdate { .. } => "event_stream_update",
            Action::EventStreamOccupy { .. } => "event_stream_occupy",
            Action::EventSubscriptionAdd { .. } => "event_subscription_add",
            Action::EventSubscriptionRemove { .. } => "event_subscription_remove",
            Action::EventSubscriptionUpdate { .. } => "event_subscription_update",
            Action::EventSubscriptionPeerAdd { .. } => "event_subscription_peer_add",
            Action::EventSubscriptionPeerRemove { .. } => "event_subscription_peer_remove",
            Action::EventRealmEmojiUpdate { .. } => "event_realm_emoji_update",
            Action::EventRealmFilters { .. } => "event_realm_filters",
            Action::EventUpdateDisplaySettings { .. } => "event_update_display_settings",
            Action::EventUpdateGlobalNotificationsSettings { .. } => {
                "event_update_global_notifications_settings"
            }
            Action::Ignore { .. } => "ignore",
            Action::Unknown { .. } => "unknown",
        }
    }

    /// The server event id, for actions translated from the event queue.
    pub fn event_id(&self) -> Option<EventId> {
        match self {
            Action::EventNewMessage { id, .. }
            | Action::EventMessageDelete { id, .. }
            | Action::EventUpdateMessage { id, .. }
            | Action::EventUpdateMessageFlags { id, .. }
            | Action::EventReactionAdd { id, .. }
            | Action::EventReactionRemove { id, .. }
            | Action::EventPresence { id, .. }
            | Action::EventTypingStart { id, .. }
            | Action::EventTypingStop { id, .. }
            | Action::EventUserAdd { id, .. }
            | Action::EventUserRemove { id, .. }
            | Action::EventUserUpdate { id, .. }
            | Action::EventMutedTopics { id, .. }
            | Action::EventUserGroupAdd { id, .. }
            | Action::EventUserGroupRemove { id, .. }
            | Action::EventUserGroupUpdate { id, .. }
            | Action::EventUserGroupAddMembers { id, .. }
            | Action::EventUserGroupRemoveMembers { id, .. }
            | Action::EventStreamAdd { id, .. }
            | Action::EventStreamRemove { id, .. }
            | Action::EventStreamUpdate { id, .. }
            | Action::EventStreamOccupy { id, .. }
            | Action::EventSubscriptionAdd { id, .. }
            | Action::EventSubscriptionRemove { id, .. }
            | Action::EventSubscriptionUpdate { id, .. }
            | Action::EventSubscriptionPeerAdd { id, .. }
            | Action::EventSubscriptionPeerRemove { id, .. }
            | Action::EventRealmEmojiUpdate { id, .. }
            | Action::EventRealmFilters { id, .. }
            | Action::EventUpdateDisplaySettings { id, .. }
            | Action::EventUpdateGlobalNotificationsSettings { id, .. }
            | Action::Ignore { id } => Some(*id),
            Action::Unknown { event } => event.get("id").and_then(Value::as_i64).map(EventId),
            _ => None,
        }
    }

    /// Actions after which no per-account data may survive.
    pub fn resets_account_data(&self) -> bool {
        matches!(
            self,
            Action::AccountSwitch { .. } | Action::LoginSuccess { .. } | Action::Logout
        )
    }
}
