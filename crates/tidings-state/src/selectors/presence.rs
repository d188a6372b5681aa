use tidings_shared::constants::OFFLINE_THRESHOLD_SECS;
use tidings_shared::models::PresenceStatus;

use crate::snapshot::Snapshot;

/// Aggregate status of a user over all their clients at time `now`.
///
/// Reports older than [`OFFLINE_THRESHOLD_SECS`] are ignored. Any recent
/// active report wins; otherwise any recent report means idle.
pub fn presence_status(snapshot: &Snapshot, email: &str, now: i64) -> PresenceStatus {
    let Some(clients) = snapshot.presence.get(email) else {
        return PresenceStatus::Offline;
    };
    let mut status = PresenceStatus::Offline;
    for report in clients.values() {
        if now - report.timestamp > OFFLINE_THRESHOLD_SECS {
            continue;
        }
        match report.status {
            PresenceStatus::Active => return PresenceStatus::Active,
            PresenceStatus::Idle | PresenceStatus::Offline => status = PresenceStatus::Idle,
        }
    }
    status
}
