//! Shared, lock-guarded cache entry for one message.

use crate::message::domain::{MessageId, MessageRecord};
use std::sync::{PoisonError, RwLock};
use tokio::sync::{Mutex, MutexGuard};

/// A cached message shared between callers and the reconciliation hook.
///
/// Two locks guard an entry:
///
/// - the record lock, held only for the duration of a read or of one
///   field-group update, so a reader never observes a half-applied edit;
/// - the mutation gate, held by a local mutating call across its network
///   round-trip so that mutations of one entity are serialised.
///
/// Push events only take the record lock and are never queued behind the
/// mutation gate.
#[derive(Debug)]
pub struct MessageEntry {
    id: MessageId,
    record: RwLock<MessageRecord>,
    mutation_gate: Mutex<()>,
}

impl MessageEntry {
    /// Wraps a record for shared access.
    #[must_use]
    pub fn new(record: MessageRecord) -> Self {
        Self {
            id: record.id().clone(),
            record: RwLock::new(record),
            mutation_gate: Mutex::new(()),
        }
    }

    /// Returns the message identifier without taking the record lock.
    #[must_use]
    pub const fn id(&self) -> &MessageId {
        &self.id
    }

    /// Returns a consistent copy of every field.
    #[must_use]
    pub fn snapshot(&self) -> MessageRecord {
        self.read(Clone::clone)
    }

    /// Runs `f` against the record under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&MessageRecord) -> R) -> R {
        let guard = self.record.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Runs `f` against the record under the write lock.
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut MessageRecord) -> R) -> R {
        let mut guard = self.record.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Waits for exclusive access to mutate this entity remotely.
    pub(crate) async fn lock_mutations(&self) -> MutexGuard<'_, ()> {
        self.mutation_gate.lock().await
    }
}
