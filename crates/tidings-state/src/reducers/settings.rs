//! Device preferences. They outlive any single account.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{modify, set};
use crate::action::Action;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsState {
    pub locale: String,
    pub theme: String,
    /// Where links open: `default`, `embedded` or `external`.
    pub browser: String,
    pub experimental_features_enabled: bool,
    pub do_not_mark_messages_as_read: bool,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            theme: "default".to_string(),
            browser: "default".to_string(),
            experimental_features_enabled: false,
            do_not_mark_messages_as_read: false,
        }
    }
}

/// A partial settings change; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsUpdate {
    pub locale: Option<String>,
    pub theme: Option<String>,
    pub browser: Option<String>,
    pub experimental_features_enabled: Option<bool>,
    pub do_not_mark_messages_as_read: Option<bool>,
}

impl SettingsState {
    fn apply(&mut self, update: &SettingsUpdate) -> bool {
        let mut changed = false;
        if let Some(locale) = &update.locale {
            changed |= set(&mut self.locale, locale.clone());
        }
        if let Some(theme) = &update.theme {
            changed |= set(&mut self.theme, theme.clone());
        }
        if let Some(browser) = &update.browser {
            changed |= set(&mut self.browser, browser.clone());
        }
        if let Some(enabled) = update.experimental_features_enabled {
            changed |= set(&mut self.experimental_features_enabled, enabled);
        }
        if let Some(keep_unread) = update.do_not_mark_messages_as_read {
            changed |= set(&mut self.do_not_mark_messages_as_read, keep_unread);
        }
        changed
    }
}

pub fn reduce(state: &Arc<SettingsState>, action: &Action) -> Arc<SettingsState> {
    match action {
        Action::Rehydrate(snapshot) => Arc::clone(&snapshot.settings),
        Action::SettingsChange(update) => modify(state, |s| s.apply(update)),
        _ => Arc::clone(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_update() {
        let state = Arc::new(SettingsState::default());
        let next = reduce(
            &state,
            &Action::SettingsChange(SettingsUpdate {
                theme: Some("night".into()),
                ..SettingsUpdate::default()
            }),
        );
        assert_eq!(next.theme, "night");
        assert_eq!(next.locale, "en");

        let same = reduce(
            &next,
            &Action::SettingsChange(SettingsUpdate {
                theme: Some("night".into()),
                ..SettingsUpdate::default()
            }),
        );
        assert!(Arc::ptr_eq(&next, &same));
    }

    #[test]
    fn test_settings_survive_logout() {
        let state = Arc::new(SettingsState {
            locale: "de".into(),
            ..SettingsState::default()
        });
        assert!(Arc::ptr_eq(&state, &reduce(&state, &Action::Logout)));
        assert!(Arc::ptr_eq(&state, &reduce(&state, &Action::AccountSwitch { index: 1 })));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings: SettingsState = serde_json::from_str(r#"{"theme": "night"}"#).unwrap();
        assert_eq!(settings.theme, "night");
        assert_eq!(settings.browser, "default");
    }
}
