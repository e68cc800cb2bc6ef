//! Identifier-keyed cache of live messages.

use super::MessageEntry;
use crate::message::domain::{ChannelId, MessageId, MessageRecord, MessageSnapshot};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Read position of this account within a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadMarker {
    /// Latest acknowledged message.
    pub message_id: MessageId,
    /// Creation instant of that message. Everything created at or before it
    /// counts as read.
    pub timestamp: DateTime<Utc>,
}

/// Local cache of live message entities.
///
/// Entries enter the cache when first observed and leave it when their
/// deletion is confirmed. Callers holding an [`Arc<MessageEntry>`] keep the
/// entry alive after eviction, but it then reports the deleted state.
#[derive(Debug, Default)]
pub struct MessageCache {
    state: RwLock<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<MessageId, Arc<MessageEntry>>,
    read_markers: HashMap<ChannelId, ReadMarker>,
}

impl MessageCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a message the client has seen, returning its cache entry.
    ///
    /// Observing an identifier that is already cached returns the existing
    /// entry untouched; later server state arrives through reconciliation.
    /// Messages older than the channel's read marker start acknowledged.
    pub fn observe(&self, snapshot: MessageSnapshot) -> Arc<MessageEntry> {
        let mut state = self.write_state();
        if let Some(existing) = state.entries.get(&snapshot.id) {
            return Arc::clone(existing);
        }

        let mut record = MessageRecord::from_snapshot(snapshot);
        let already_read = state
            .read_markers
            .get(record.channel_id())
            .is_some_and(|marker| record.timestamp() <= marker.timestamp);
        if already_read {
            // A freshly built record is live, so this cannot fail.
            record.acknowledge().ok();
        }

        let entry = Arc::new(MessageEntry::new(record));
        state
            .entries
            .insert(entry.id().clone(), Arc::clone(&entry));
        entry
    }

    /// Returns the cached entry for `id`.
    #[must_use]
    pub fn get(&self, id: &MessageId) -> Option<Arc<MessageEntry>> {
        self.read_state().entries.get(id).cloned()
    }

    /// Returns `true` if `id` is cached.
    #[must_use]
    pub fn contains(&self, id: &MessageId) -> bool {
        self.read_state().entries.contains_key(id)
    }

    /// Removes `id` from the cache, returning the evicted entry.
    pub fn evict(&self, id: &MessageId) -> Option<Arc<MessageEntry>> {
        self.write_state().entries.remove(id)
    }

    /// Returns the number of cached messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read_state().entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_state().entries.is_empty()
    }

    /// Returns the read marker for a channel.
    #[must_use]
    pub fn read_marker(&self, channel_id: &ChannelId) -> Option<ReadMarker> {
        self.read_state().read_markers.get(channel_id).cloned()
    }

    /// Advances a channel's read marker and flags every cached message in the
    /// channel created at or before it as acknowledged.
    ///
    /// The marker never moves backwards. Returns the number of entries newly
    /// flagged.
    pub fn acknowledge_through(&self, channel_id: &ChannelId, marker: ReadMarker) -> usize {
        let mut state = self.write_state();
        let advanced = state
            .read_markers
            .get(channel_id)
            .is_none_or(|current| marker.timestamp >= current.timestamp);
        if advanced {
            state.read_markers.insert(channel_id.clone(), marker);
        }

        let Some(through) = state.read_markers.get(channel_id).map(|m| m.timestamp) else {
            return 0;
        };

        let mut flagged = 0;
        for entry in state.entries.values() {
            let newly_read = entry.write(|record| {
                record.channel_id() == channel_id
                    && record.timestamp() <= through
                    && record.acknowledge().unwrap_or(false)
            });
            if newly_read {
                flagged += 1;
            }
        }
        flagged
    }
}
