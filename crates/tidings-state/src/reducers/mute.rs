use std::sync::Arc;

use tidings_shared::models::MutedTopic;

use super::{initial, replace};
use crate::action::Action;

pub type MuteState = Vec<MutedTopic>;

pub fn reduce(state: &Arc<MuteState>, action: &Action) -> Arc<MuteState> {
    match action {
        Action::Rehydrate(snapshot) => Arc::clone(&snapshot.mute),
        a if a.resets_account_data() => initial(state),
        Action::RegisterComplete(data) => replace(state, data.muted_topics.clone()),
        Action::EventMutedTopics { muted_topics, .. } => replace(state, muted_topics.clone()),
        _ => Arc::clone(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::eid;

    #[test]
    fn test_event_replaces_list() {
        let muted = vec![MutedTopic {
            stream: "general".into(),
            topic: "lunch".into(),
        }];
        let state = Arc::new(MuteState::new());
        let action = Action::EventMutedTopics {
            id: eid(),
            muted_topics: muted.clone(),
        };
        let next = reduce(&state, &action);
        assert_eq!(*next, muted);
        assert!(Arc::ptr_eq(&next, &reduce(&next, &action)));
        assert!(reduce(&next, &Action::Logout).is_empty());
    }
}
