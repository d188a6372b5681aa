//! Per-emoji reaction summaries for display under a message.

use tidings_shared::models::{Reaction, ReactionType};
use tidings_shared::types::{MessageId, UserId};

use crate::snapshot::Snapshot;

/// All reactions with one emoji on one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedReaction {
    /// Display name of the first reaction seen with this emoji.
    pub name: String,
    pub code: String,
    pub reaction_type: ReactionType,
    pub count: usize,
    pub self_reacted: bool,
    /// Sorted reactor ids, for the details view.
    pub users: Vec<UserId>,
}

/// Group `reactions` by `(emoji_code, reaction_type)`, keeping the order in
/// which each emoji first appears.
pub fn aggregate_reactions(reactions: &[Reaction], own_user_id: UserId) -> Vec<AggregatedReaction> {
    let mut groups: Vec<AggregatedReaction> = Vec::new();
    for reaction in reactions {
        let group = match groups
            .iter_mut()
            .position(|g| g.code == reaction.emoji_code && g.reaction_type == reaction.reaction_type)
        {
            Some(i) => &mut groups[i],
            None => {
                groups.push(AggregatedReaction {
                    name: reaction.emoji_name.clone(),
                    code: reaction.emoji_code.clone(),
                    reaction_type: reaction.reaction_type,
                    count: 0,
                    self_reacted: false,
                    users: Vec::new(),
                });
                let last = groups.len() - 1;
                &mut groups[last]
            }
        };
        if let Err(pos) = group.users.binary_search(&reaction.user_id) {
            group.users.insert(pos, reaction.user_id);
            group.count += 1;
        }
        group.self_reacted |= reaction.user_id == own_user_id;
    }
    groups
}

/// Aggregated reactions of a message, `None` when the message is not loaded.
pub fn message_reactions(
    snapshot: &Snapshot,
    message_id: MessageId,
    own_user_id: UserId,
) -> Option<Vec<AggregatedReaction>> {
    snapshot
        .messages
        .get(&message_id)
        .map(|message| aggregate_reactions(&message.reactions, own_user_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::testing::{reaction, stream_message};

    #[test]
    fn test_aggregation_groups_by_emoji() {
        let reactions = vec![reaction(1, "x"), reaction(2, "x"), reaction(1, "y")];
        let groups = aggregate_reactions(&reactions, UserId(1));
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].code, "x");
        assert_eq!(groups[0].count, 2);
        assert!(groups[0].self_reacted);
        assert_eq!(groups[0].users, vec![UserId(1), UserId(2)]);

        assert_eq!(groups[1].code, "y");
        assert_eq!(groups[1].count, 1);
        assert!(groups[1].self_reacted);
    }

    #[test]
    fn test_same_code_different_type_is_separate() {
        let mut realm = reaction(3, "x");
        realm.reaction_type = ReactionType::RealmEmoji;
        let groups = aggregate_reactions(&[reaction(2, "x"), realm], UserId(1));
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| !g.self_reacted));
    }

    #[test]
    fn test_message_reactions() {
        let mut message = stream_message(5, "general", "lunch");
        message.reactions = vec![reaction(2, "x")];
        let snapshot = Snapshot {
            messages: Arc::new([(MessageId(5), message)].into()),
            ..Snapshot::default()
        };
        assert_eq!(message_reactions(&snapshot, MessageId(5), UserId(1)).map(|r| r.len()), Some(1));
        assert_eq!(message_reactions(&snapshot, MessageId(6), UserId(1)), None);
    }
}
