use std::collections::BTreeMap;
use std::sync::Arc;

use tidings_shared::types::ConversationKey;

use super::{initial, modify};
use crate::action::Action;

/// Unsent compose-box content per conversation.
pub type DraftsState = BTreeMap<ConversationKey, String>;

pub fn reduce(state: &Arc<DraftsState>, action: &Action) -> Arc<DraftsState> {
    match action {
        Action::Rehydrate(snapshot) => Arc::clone(&snapshot.drafts),
        a if a.resets_account_data() => initial(state),

        Action::DraftUpdate { narrow, content } => {
            let Some(key) = narrow.conversation_key() else {
                return Arc::clone(state);
            };
            modify(state, |drafts| {
                if content.trim().is_empty() {
                    drafts.remove(&key).is_some()
                } else if drafts.get(&key) == Some(content) {
                    false
                } else {
                    drafts.insert(key, content.clone());
                    true
                }
            })
        }

        _ => Arc::clone(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidings_shared::narrow::Narrow;
    use tidings_shared::types::UserId;

    fn update(narrow: Narrow, content: &str) -> Action {
        Action::DraftUpdate {
            narrow,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_equivalent_narrows_share_a_draft() {
        let state = Arc::new(DraftsState::new());
        let next = reduce(
            &state,
            &update(Narrow::private([UserId(3), UserId(2)]), "see you"),
        );
        let same = reduce(&next, &update(Narrow::private([UserId(2), UserId(3)]), "see you"));
        assert!(Arc::ptr_eq(&next, &same));
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn test_topic_case_does_not_split_drafts() {
        let state = Arc::new(DraftsState::new());
        let next = reduce(&state, &update(Narrow::topic("general", "Lunch"), "first"));
        let next = reduce(&next, &update(Narrow::topic("general", "lunch"), "second"));
        assert_eq!(next.len(), 1);
        assert_eq!(
            next.get(&ConversationKey::topic("general", "LUNCH")).map(String::as_str),
            Some("second")
        );
    }

    #[test]
    fn test_blank_content_removes_draft() {
        let narrow = Narrow::topic("general", "lunch");
        let state = reduce(&Arc::new(DraftsState::new()), &update(narrow.clone(), "hi"));
        let cleared = reduce(&state, &update(narrow.clone(), "  \n "));
        assert!(cleared.is_empty());
        assert!(Arc::ptr_eq(&cleared, &reduce(&cleared, &update(narrow, ""))));
    }

    #[test]
    fn test_multi_conversation_narrows_are_ignored() {
        let state = Arc::new(DraftsState::new());
        for narrow in [Narrow::Home, Narrow::Starred, Narrow::Private { user_ids: vec![] }] {
            assert!(Arc::ptr_eq(&state, &reduce(&state, &update(narrow, "text"))));
        }
    }
}
