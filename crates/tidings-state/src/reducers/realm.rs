//! Organization-wide settings plus the own user's server-side preferences.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tidings_shared::models::{RealmEmoji, RealmFilter};

use super::{initial, modify, replace, set};
use crate::action::Action;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealmState {
    pub name: String,
    pub icon_url: String,
    pub twenty_four_hour_time: bool,
    pub can_create_streams: bool,
    pub is_admin: bool,
    pub emoji: BTreeMap<String, RealmEmoji>,
    pub filters: Vec<RealmFilter>,
    pub enable_offline_push_notifications: bool,
    pub enable_online_push_notifications: bool,
    pub enable_stream_push_notifications: bool,
}

pub fn reduce(state: &Arc<RealmState>, action: &Action) -> Arc<RealmState> {
    match action {
        Action::Rehydrate(snapshot) => Arc::clone(&snapshot.realm),
        a if a.resets_account_data() => initial(state),

        Action::RegisterComplete(data) => replace(
            state,
            RealmState {
                name: data.realm_name.clone(),
                icon_url: data.realm_icon_url.clone(),
                twenty_four_hour_time: data.twenty_four_hour_time,
                can_create_streams: data.can_create_streams,
                is_admin: data.is_admin,
                emoji: data.realm_emoji.clone(),
                filters: data.realm_filters.clone(),
                enable_offline_push_notifications: data.enable_offline_push_notifications,
                enable_online_push_notifications: data.enable_online_push_notifications,
                enable_stream_push_notifications: data.enable_stream_push_notifications,
            },
        ),

        Action::InitRealmEmoji { emoji }
        | Action::EventRealmEmojiUpdate {
            realm_emoji: emoji, ..
        } => modify(state, |realm| set(&mut realm.emoji, emoji.clone())),

        Action::InitRealmFilters { filters }
        | Action::EventRealmFilters {
            realm_filters: filters,
            ..
        } => modify(state, |realm| set(&mut realm.filters, filters.clone())),

        Action::EventUpdateDisplaySettings {
            setting_name,
            setting,
            ..
        } => match (setting_name.as_str(), setting.as_bool()) {
            ("twenty_four_hour_time", Some(value)) => {
                modify(state, |realm| set(&mut realm.twenty_four_hour_time, value))
            }
            _ => Arc::clone(state),
        },

        Action::EventUpdateGlobalNotificationsSettings {
            notification_name,
            setting,
            ..
        } => modify(state, |realm| {
            let field = match notification_name.as_str() {
                "enable_offline_push_notifications" => &mut realm.enable_offline_push_notifications,
                "enable_online_push_notifications" => &mut realm.enable_online_push_notifications,
                "enable_stream_push_notifications" => &mut realm.enable_stream_push_notifications,
                _ => return false,
            };
            set(field, *setting)
        }),

        _ => Arc::clone(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tidings_shared::protocol::InitialData;
    use tidings_shared::types::EventId;

    #[test]
    fn test_register_complete_fills_realm() {
        let data: InitialData = serde_json::from_value(json!({
            "realm_name": "Example",
            "twenty_four_hour_time": true,
            "realm_filters": [["#(?P<id>[0-9]+)", "https://example.com/%(id)s", 1]],
            "enable_offline_push_notifications": true
        }))
        .unwrap();
        let state = Arc::new(RealmState::default());
        let next = reduce(&state, &Action::RegisterComplete(Box::new(data)));
        assert_eq!(next.name, "Example");
        assert!(next.twenty_four_hour_time);
        assert_eq!(next.filters.len(), 1);
        assert!(next.enable_offline_push_notifications);
        assert!(!next.enable_stream_push_notifications);
    }

    #[test]
    fn test_display_and_notification_settings() {
        let state = Arc::new(RealmState::default());
        let next = reduce(
            &state,
            &Action::EventUpdateDisplaySettings {
                id: EventId(1),
                setting_name: "twenty_four_hour_time".into(),
                setting: json!(true),
            },
        );
        assert!(next.twenty_four_hour_time);

        let unknown = Action::EventUpdateDisplaySettings {
            id: EventId(2),
            setting_name: "emojiset".into(),
            setting: json!("google"),
        };
        assert!(Arc::ptr_eq(&next, &reduce(&next, &unknown)));

        let notified = reduce(
            &next,
            &Action::EventUpdateGlobalNotificationsSettings {
                id: EventId(3),
                notification_name: "enable_stream_push_notifications".into(),
                setting: true,
            },
        );
        assert!(notified.enable_stream_push_notifications);

        let other = Action::EventUpdateGlobalNotificationsSettings {
            id: EventId(4),
            notification_name: "enable_sounds".into(),
            setting: true,
        };
        assert!(Arc::ptr_eq(&notified, &reduce(&notified, &other)));
    }

    #[test]
    fn test_emoji_update_replaces_map() {
        let emoji = BTreeMap::from([(
            "1".to_string(),
            RealmEmoji {
                id: "1".into(),
                name: "party".into(),
                source_url: "/user_avatars/1/emoji/party.png".into(),
                deactivated: false,
            },
        )]);
        let state = Arc::new(RealmState::default());
        let next = reduce(&state, &Action::InitRealmEmoji { emoji: emoji.clone() });
        assert_eq!(next.emoji, emoji);
        let same = reduce(
            &next,
            &Action::EventRealmEmojiUpdate {
                id: EventId(9),
                realm_emoji: emoji,
            },
        );
        assert!(Arc::ptr_eq(&next, &same));
        assert!(reduce(&same, &Action::Logout).emoji.is_empty());
    }
}
