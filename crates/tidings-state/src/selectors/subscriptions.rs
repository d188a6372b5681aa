//! Streams, subscriptions, topics and mutes.

use tidings_shared::models::{Stream, Subscription, Topic};
use tidings_shared::narrow::Narrow;
use tidings_shared::types::StreamId;

use crate::snapshot::Snapshot;

/// Subscriptions to streams we know about: pinned first, then by name.
/// Orphaned subscriptions are left out.
pub fn subscribed_streams(snapshot: &Snapshot) -> Vec<&Subscription> {
    let mut subs: Vec<&Subscription> = snapshot
        .subscriptions
        .values()
        .filter(|sub| snapshot.streams.contains_key(&sub.stream_id))
        .collect();
    subs.sort_by(|a, b| {
        b.pin_to_top
            .cmp(&a.pin_to_top)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    subs
}

/// Subscriptions whose stream is missing from the streams slice.
pub fn orphaned_subscriptions(snapshot: &Snapshot) -> Vec<&Subscription> {
    snapshot
        .subscriptions
        .values()
        .filter(|sub| !snapshot.streams.contains_key(&sub.stream_id))
        .collect()
}

/// Streams we could subscribe to, by name.
pub fn unsubscribed_streams(snapshot: &Snapshot) -> Vec<&Stream> {
    let mut streams: Vec<&Stream> = snapshot
        .streams
        .values()
        .filter(|s| !snapshot.subscriptions.contains_key(&s.stream_id))
        .collect();
    streams.sort_by_key(|s| s.name.to_lowercase());
    streams
}

pub fn is_stream_subscribed(snapshot: &Snapshot, stream_name: &str) -> bool {
    snapshot
        .subscriptions
        .values()
        .any(|sub| sub.name == stream_name)
}

/// Whether the user is subscribed to the stream a narrow points at. Narrows
/// that are not about a single stream count as subscribed.
pub fn is_narrow_subscribed(snapshot: &Snapshot, narrow: &Narrow) -> bool {
    match narrow.stream_name() {
        Some(stream) => is_stream_subscribed(snapshot, stream),
        None => true,
    }
}

/// Topics of a stream, most recent first. `None` until they were fetched.
pub fn topics_for_stream(snapshot: &Snapshot, stream_id: StreamId) -> Option<&[Topic]> {
    snapshot.topics.get(&stream_id).map(Vec::as_slice)
}

pub fn is_topic_muted(snapshot: &Snapshot, stream: &str, topic: &str) -> bool {
    snapshot
        .mute
        .iter()
        .any(|m| m.stream == stream && m.topic == topic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tidings_shared::models::MutedTopic;

    use crate::testing::{stream, subscription};

    fn snapshot() -> Snapshot {
        let mut pinned = subscription(3, "zebra");
        pinned.pin_to_top = true;
        Snapshot {
            streams: Arc::new(
                [stream(1, "general"), stream(2, "Dev"), stream(3, "zebra"), stream(4, "random")]
                    .into_iter()
                    .map(|s| (s.stream_id, s))
                    .collect(),
            ),
            subscriptions: Arc::new(
                [subscription(1, "general"), subscription(2, "Dev"), pinned, subscription(9, "gone")]
                    .into_iter()
                    .map(|s| (s.stream_id, s))
                    .collect(),
            ),
            mute: Arc::new(vec![MutedTopic {
                stream: "general".into(),
                topic: "lunch".into(),
            }]),
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_subscribed_streams_order_and_orphans() {
        let snapshot = snapshot();
        let names: Vec<&str> = subscribed_streams(&snapshot)
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["zebra", "Dev", "general"]);

        let orphans = orphaned_subscriptions(&snapshot);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].stream_id, StreamId(9));

        let unsubscribed: Vec<&str> = unsubscribed_streams(&snapshot)
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(unsubscribed, vec!["random"]);
    }

    #[test]
    fn test_narrow_subscription() {
        let snapshot = snapshot();
        assert!(is_narrow_subscribed(&snapshot, &Narrow::topic("general", "x")));
        assert!(!is_narrow_subscribed(&snapshot, &Narrow::stream("random")));
        assert!(is_narrow_subscribed(&snapshot, &Narrow::Starred));
    }

    #[test]
    fn test_topics_and_mutes() {
        let snapshot = snapshot();
        assert!(is_topic_muted(&snapshot, "general", "lunch"));
        assert!(!is_topic_muted(&snapshot, "general", "dinner"));
        assert!(topics_for_stream(&snapshot, StreamId(1)).is_none());
    }
}
