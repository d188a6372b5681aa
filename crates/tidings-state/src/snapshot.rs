//! The immutable aggregate of all slices.

use std::sync::Arc;

use serde_json::Value;
use tidings_shared::constants::{
    MIGRATIONS_KEY, SLICE_ACCOUNTS, SLICE_DRAFTS, SLICE_MESSAGES, SLICE_MUTE, SLICE_OUTBOX,
    SLICE_REALM, SLICE_SETTINGS, SLICE_STREAMS, SLICE_SUBSCRIPTIONS, SLICE_TOPICS,
    SLICE_USERS, SLICE_USER_GROUPS,
};

use crate::reducers::accounts::AccountsState;
use crate::reducers::drafts::DraftsState;
use crate::reducers::fetching::FetchingState;
use crate::reducers::messages::MessagesState;
use crate::reducers::mute::MuteState;
use crate::reducers::outbox::OutboxState;
use crate::reducers::presence::PresenceState;
use crate::reducers::realm::RealmState;
use crate::reducers::session::SessionState;
use crate::reducers::settings::SettingsState;
use crate::reducers::streams::StreamsState;
use crate::reducers::subscriptions::SubscriptionsState;
use crate::reducers::topics::TopicsState;
use crate::reducers::typing::TypingState;
use crate::reducers::user_groups::UserGroupsState;
use crate::reducers::users::UsersState;
use crate::rehydrate::{PersistedState, CURRENT_VERSION};

/// Slices written to persistent storage. The others (`session`, `fetching`,
/// `presence`, `typing`) only make sense for the running process.
pub const PERSISTED_SLICES: [&str; 12] = [
    SLICE_ACCOUNTS,
    SLICE_SETTINGS,
    SLICE_REALM,
    SLICE_USERS,
    SLICE_STREAMS,
    SLICE_SUBSCRIPTIONS,
    SLICE_TOPICS,
    SLICE_MESSAGES,
    SLICE_OUTBOX,
    SLICE_DRAFTS,
    SLICE_USER_GROUPS,
    SLICE_MUTE,
];

/// All client state at one point in the action stream.
///
/// Never mutated once published: [`crate::root::reduce`] builds a new
/// snapshot that shares every untouched slice with its predecessor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub accounts: Arc<AccountsState>,
    pub session: Arc<SessionState>,
    pub settings: Arc<SettingsState>,
    pub realm: Arc<RealmState>,
    pub users: Arc<UsersState>,
    pub streams: Arc<StreamsState>,
    pub subscriptions: Arc<SubscriptionsState>,
    pub topics: Arc<TopicsState>,
    pub messages: Arc<MessagesState>,
    pub fetching: Arc<FetchingState>,
    pub outbox: Arc<OutboxState>,
    pub drafts: Arc<DraftsState>,
    pub presence: Arc<PresenceState>,
    pub typing: Arc<TypingState>,
    pub user_groups: Arc<UserGroupsState>,
    pub mute: Arc<MuteState>,
}

impl Snapshot {
    /// Whether every slice of `self` is the same allocation as in `other`.
    pub fn shares_all_slices(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.accounts, &other.accounts)
            && Arc::ptr_eq(&self.session, &other.session)
            && Arc::ptr_eq(&self.settings, &other.settings)
            && Arc::ptr_eq(&self.realm, &other.realm)
            && Arc::ptr_eq(&self.users, &other.users)
            && Arc::ptr_eq(&self.streams, &other.streams)
            && Arc::ptr_eq(&self.subscriptions, &other.subscriptions)
            && Arc::ptr_eq(&self.topics, &other.topics)
            && Arc::ptr_eq(&self.messages, &other.messages)
            && Arc::ptr_eq(&self.fetching, &other.fetching)
            && Arc::ptr_eq(&self.outbox, &other.outbox)
            && Arc::ptr_eq(&self.drafts, &other.drafts)
            && Arc::ptr_eq(&self.presence, &other.presence)
            && Arc::ptr_eq(&self.typing, &other.typing)
            && Arc::ptr_eq(&self.user_groups, &other.user_groups)
            && Arc::ptr_eq(&self.mute, &other.mute)
    }

    /// Names of the persisted slices whose allocation differs from `other`'s.
    pub fn changed_persisted_slices(&self, other: &Snapshot) -> Vec<&'static str> {
        let pairs: [(&'static str, bool); 12] = [
            (SLICE_ACCOUNTS, Arc::ptr_eq(&self.accounts, &other.accounts)),
            (SLICE_SETTINGS, Arc::ptr_eq(&self.settings, &other.settings)),
            (SLICE_REALM, Arc::ptr_eq(&self.realm, &other.realm)),
            (SLICE_USERS, Arc::ptr_eq(&self.users, &other.users)),
            (SLICE_STREAMS, Arc::ptr_eq(&self.streams, &other.streams)),
            (
                SLICE_SUBSCRIPTIONS,
                Arc::ptr_eq(&self.subscriptions, &other.subscriptions),
            ),
            (SLICE_TOPICS, Arc::ptr_eq(&self.topics, &other.topics)),
            (SLICE_MESSAGES, Arc::ptr_eq(&self.messages, &other.messages)),
            (SLICE_OUTBOX, Arc::ptr_eq(&self.outbox, &other.outbox)),
            (SLICE_DRAFTS, Arc::ptr_eq(&self.drafts, &other.drafts)),
            (
                SLICE_USER_GROUPS,
                Arc::ptr_eq(&self.user_groups, &other.user_groups),
            ),
            (SLICE_MUTE, Arc::ptr_eq(&self.mute, &other.mute)),
        ];
        pairs
            .into_iter()
            .filter(|(_, same)| !same)
            .map(|(name, _)| name)
            .collect()
    }

    /// Serialize one persisted slice. `None` for names that are not persisted.
    pub fn slice_to_value(&self, name: &str) -> Option<serde_json::Result<Value>> {
        let value = match name {
            SLICE_ACCOUNTS => serde_json::to_value(&*self.accounts),
            SLICE_SETTINGS => serde_json::to_value(&*self.settings),
            SLICE_REALM => serde_json::to_value(&*self.realm),
            SLICE_USERS => serde_json::to_value(&*self.users),
            SLICE_STREAMS => serde_json::to_value(&*self.streams),
            SLICE_SUBSCRIPTIONS => serde_json::to_value(&*self.subscriptions),
            SLICE_TOPICS => serde_json::to_value(&*self.topics),
            SLICE_MESSAGES => serde_json::to_value(&*self.messages),
            SLICE_OUTBOX => serde_json::to_value(&*self.outbox),
            SLICE_DRAFTS => serde_json::to_value(&*self.drafts),
            SLICE_USER_GROUPS => serde_json::to_value(&*self.user_groups),
            SLICE_MUTE => serde_json::to_value(&*self.mute),
            _ => return None,
        };
        Some(value)
    }

    /// The persisted layout: one entry per persisted slice plus the
    /// migration version the layout conforms to.
    pub fn to_persisted(&self) -> serde_json::Result<PersistedState> {
        let mut persisted = PersistedState::new();
        for name in PERSISTED_SLICES {
            if let Some(value) = self.slice_to_value(name) {
                persisted.insert(name.to_string(), value?);
            }
        }
        persisted.insert(MIGRATIONS_KEY.to_string(), migrations_marker());
        Ok(persisted)
    }
}

/// The `"migrations"` entry written alongside the slices.
pub fn migrations_marker() -> Value {
    serde_json::json!({ "version": CURRENT_VERSION })
}
