/// Application name
pub const APP_NAME: &str = "Tidings";

/// Message flags, as named by the server.
pub const FLAG_READ: &str = "read";
pub const FLAG_STARRED: &str = "starred";
pub const FLAG_COLLAPSED: &str = "collapsed";
pub const FLAG_MENTIONED: &str = "mentioned";
pub const FLAG_WILDCARD_MENTIONED: &str = "wildcard_mentioned";
pub const FLAG_HAS_ALERT_WORD: &str = "has_alert_word";
pub const FLAG_HISTORICAL: &str = "historical";

/// A presence report older than this is treated as offline.
pub const OFFLINE_THRESHOLD_SECS: i64 = 140;

/// Typing indicators not refreshed within this window are considered stale.
pub const TYPING_EXPIRY_SECS: i64 = 15;

/// Slice names of the persisted state layout.
pub const SLICE_ACCOUNTS: &str = "accounts";
pub const SLICE_SETTINGS: &str = "settings";
pub const SLICE_REALM: &str = "realm";
pub const SLICE_USERS: &str = "users";
pub const SLICE_STREAMS: &str = "streams";
pub const SLICE_SUBSCRIPTIONS: &str = "subscriptions";
pub const SLICE_TOPICS: &str = "topics";
pub const SLICE_MESSAGES: &str = "messages";
pub const SLICE_OUTBOX: &str = "outbox";
pub const SLICE_DRAFTS: &str = "drafts";
pub const SLICE_USER_GROUPS: &str = "user_groups";
pub const SLICE_MUTE: &str = "mute";

/// Key holding the migration version inside the persisted layout.
pub const MIGRATIONS_KEY: &str = "migrations";
