//! The device-level list of logins. The first entry is the active account.
//!
//! Unlike the per-account slices this one survives account switches and
//! logout: switching reorders it, logout only drops the active api key.

use std::sync::Arc;

use tidings_shared::models::{Account, Identity};

use super::modify;
use crate::action::Action;

pub type AccountsState = Vec<Account>;

pub fn reduce(state: &Arc<AccountsState>, action: &Action) -> Arc<AccountsState> {
    match action {
        Action::Rehydrate(snapshot) => Arc::clone(&snapshot.accounts),

        Action::AccountSwitch { index } => {
            if *index == 0 || *index >= state.len() {
                return Arc::clone(state);
            }
            modify(state, |accounts| {
                let account = accounts.remove(*index);
                accounts.insert(0, account);
                true
            })
        }

        Action::RealmAdd {
            realm,
            zulip_version,
        } => modify(state, |accounts| {
            match accounts.iter().position(|a| a.realm == *realm) {
                Some(i) => {
                    let mut account = accounts.remove(i);
                    let mut changed = i != 0;
                    if zulip_version.is_some() && account.zulip_version != *zulip_version {
                        account.zulip_version = zulip_version.clone();
                        changed = true;
                    }
                    accounts.insert(0, account);
                    changed
                }
                None => {
                    let mut account = Account::new(realm.clone());
                    account.zulip_version = zulip_version.clone();
                    accounts.insert(0, account);
                    true
                }
            }
        }),

        Action::AccountRemove { index } => {
            if *index >= state.len() {
                return Arc::clone(state);
            }
            modify(state, |accounts| {
                accounts.remove(*index);
                true
            })
        }

        Action::LoginSuccess {
            realm,
            email,
            api_key,
        } => modify(state, |accounts| {
            let existing = accounts
                .iter()
                .position(|a| a.realm == *realm && (a.email == *email || a.email.is_empty()));
            if let Some(0) = existing {
                if accounts[0].email == *email && accounts[0].api_key == *api_key {
                    return false;
                }
            }
            let mut account = match existing {
                Some(i) => accounts.remove(i),
                None => Account::new(realm.clone()),
            };
            account.email = email.clone();
            account.api_key = api_key.clone();
            accounts.insert(0, account);
            true
        }),

        Action::Logout => modify(state, |accounts| match accounts.first_mut() {
            Some(active) if active.has_auth() => {
                active.api_key.clear();
                true
            }
            _ => false,
        }),

        Action::RegisterComplete(data) => modify(state, |accounts| {
            let Some(active) = accounts.first_mut() else {
                return false;
            };
            let mut changed = false;
            if data.user_id.is_some() && active.user_id != data.user_id {
                active.user_id = data.user_id;
                changed = true;
            }
            if data.zulip_version.is_some() && active.zulip_version != data.zulip_version {
                active.zulip_version = data.zulip_version.clone();
                changed = true;
            }
            changed
        }),

        Action::AckPushToken {
            identity,
            push_token,
        } => set_acked_token(state, identity, Some(push_token)),

        Action::UnackPushToken { identity } => set_acked_token(state, identity, None),

        _ => Arc::clone(state),
    }
}

fn set_acked_token(
    state: &Arc<AccountsState>,
    identity: &Identity,
    token: Option<&String>,
) -> Arc<AccountsState> {
    modify(state, |accounts| {
        match accounts.iter_mut().find(|a| a.identity() == *identity) {
            Some(account) if account.acked_push_token.as_ref() != token => {
                account.acked_push_token = token.cloned();
                true
            }
            _ => false,
        }
    })
}
