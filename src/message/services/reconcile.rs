//! Application of server-pushed message notifications to the cache.

use super::MessageCache;
use crate::message::ports::{PushEvent, PushEventBody, PushEventFeed};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

/// What applying one push event did to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The cached entity changed.
    Applied,
    /// The event repeated state the entity already had.
    Unchanged,
    /// The entity was already deleted.
    AlreadyDeleted,
    /// No cached entity has the event's identifier; the event was ignored.
    Unknown,
}

/// Applies push notifications to cached messages.
///
/// The server is authoritative: edits overwrite content, mentions, and
/// edited instant without merging; deletes are terminal. Events are applied
/// one at a time in the order they are handed over, and never wait on a local
/// call that is in flight for the same entity.
#[derive(Debug, Clone)]
pub struct ReconciliationHook {
    cache: Arc<MessageCache>,
}

impl ReconciliationHook {
    /// Creates a hook over `cache`.
    #[must_use]
    pub const fn new(cache: Arc<MessageCache>) -> Self {
        Self { cache }
    }

    /// Applies a single event.
    pub fn apply(&self, event: PushEvent) -> ReconcileOutcome {
        let Some(entry) = self.cache.get(&event.message_id) else {
            trace!(
                message_id = %event.message_id,
                kind = ?event.kind(),
                "ignoring notification for uncached message"
            );
            return ReconcileOutcome::Unknown;
        };

        let message_id = event.message_id;
        match event.body {
            PushEventBody::Edit(edit) => {
                let outcome = entry.write(|record| match record.apply_edit(edit) {
                    Ok(true) => ReconcileOutcome::Applied,
                    Ok(false) => ReconcileOutcome::Unchanged,
                    Err(_) => ReconcileOutcome::AlreadyDeleted,
                });
                debug!(message_id = %message_id, outcome = ?outcome, "applied pushed edit");
                outcome
            }
            PushEventBody::Delete => {
                let deleted = entry.write(|record| record.mark_deleted());
                self.cache.evict(&message_id);
                if deleted {
                    info!(message_id = %message_id, "message deleted remotely");
                    ReconcileOutcome::Applied
                } else {
                    ReconcileOutcome::AlreadyDeleted
                }
            }
        }
    }

    /// Drains `feed`, applying events in arrival order until it ends.
    ///
    /// Returns the number of events consumed.
    pub async fn run<F>(&self, feed: &mut F) -> usize
    where
        F: PushEventFeed + ?Sized,
    {
        let mut consumed = 0;
        while let Some(event) = feed.next_event().await {
            self.apply(event);
            consumed += 1;
        }
        debug!(consumed, "push feed ended");
        consumed
    }

    /// Runs [`ReconciliationHook::run`] on a background task.
    pub fn spawn<F>(self: Arc<Self>, mut feed: F) -> JoinHandle<usize>
    where
        F: PushEventFeed + 'static,
    {
        tokio::spawn(async move { self.run(&mut feed).await })
    }
}
