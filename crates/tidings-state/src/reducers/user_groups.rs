use std::sync::Arc;

use tidings_shared::models::UserGroup;
use tidings_shared::types::{GroupId, UserId};

use super::{initial, modify, replace};
use crate::action::Action;

pub type UserGroupsState = Vec<UserGroup>;

pub fn reduce(state: &Arc<UserGroupsState>, action: &Action) -> Arc<UserGroupsState> {
    match action {
        Action::Rehydrate(snapshot) => Arc::clone(&snapshot.user_groups),
        a if a.resets_account_data() => initial(state),
        Action::RegisterComplete(data) => replace(state, data.realm_user_groups.clone()),

        Action::EventUserGroupAdd { group, .. } => modify(state, |groups| {
            match groups.iter_mut().find(|g| g.id == group.id) {
                Some(existing) if existing == group => false,
                Some(existing) => {
                    *existing = group.clone();
                    true
                }
                None => {
                    groups.push(group.clone());
                    true
                }
            }
        }),

        Action::EventUserGroupRemove { group_id, .. } => modify(state, |groups| {
            let before = groups.len();
            groups.retain(|g| g.id != *group_id);
            groups.len() != before
        }),

        Action::EventUserGroupUpdate {
            group_id,
            name,
            description,
            ..
        } => with_group(state, *group_id, |group| {
            let mut changed = false;
            if let Some(name) = name.as_ref().filter(|n| **n != group.name) {
                group.name = name.clone();
                changed = true;
            }
            if let Some(description) = description.as_ref().filter(|d| **d != group.description) {
                group.description = description.clone();
                changed = true;
            }
            changed
        }),

        Action::EventUserGroupAddMembers {
            group_id, user_ids, ..
        } => with_group(state, *group_id, |group| add_members(group, user_ids)),

        Action::EventUserGroupRemoveMembers {
            group_id, user_ids, ..
        } => with_group(state, *group_id, |group| remove_members(group, user_ids)),

        _ => Arc::clone(state),
    }
}

/// Apply `f` to the group with `group_id`. Absent groups are left alone.
fn with_group<F>(state: &Arc<UserGroupsState>, group_id: GroupId, f: F) -> Arc<UserGroupsState>
where
    F: FnOnce(&mut UserGroup) -> bool,
{
    if !state.iter().any(|g| g.id == group_id) {
        return Arc::clone(state);
    }
    modify(state, |groups| {
        groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .map(f)
            .unwrap_or(false)
    })
}

fn add_members(group: &mut UserGroup, user_ids: &[UserId]) -> bool {
    let mut changed = false;
    for id in user_ids {
        changed |= group.members.insert(*id);
    }
    changed
}

fn remove_members(group: &mut UserGroup, user_ids: &[UserId]) -> bool {
    let mut changed = false;
    for id in user_ids {
        changed |= group.members.remove(id);
    }
    changed
}
