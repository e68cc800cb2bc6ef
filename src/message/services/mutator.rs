//! Service translating local message mutations into remote requests.

use super::{
    MessageCache, MessageEntry, MessageHandle, MutatorConfig, RateLimitPolicy, ReadMarker,
};
use crate::message::{
    domain::{
        Capability, ChannelId, MessageEdit, MessageId, MessageRecord, MessageSnapshot, Operation,
        UserId,
    },
    error::{MessageError, MessageResult},
    ports::{MessageTransport, TransportError, TransportResult},
};
use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Mediates between cached messages and the remote transport.
///
/// Every mutating call issues one request (two when a rate limit is retried)
/// and touches the cached entity only after the service has accepted the
/// change. Failed calls leave the entity exactly as it was.
pub struct RemoteMutator<T, C>
where
    T: MessageTransport,
    C: Clock + Send + Sync,
{
    transport: Arc<T>,
    cache: Arc<MessageCache>,
    clock: Arc<C>,
    config: MutatorConfig,
    identity: Option<UserId>,
}

impl<T, C> RemoteMutator<T, C>
where
    T: MessageTransport,
    C: Clock + Send + Sync,
{
    /// Creates a mutator with the default configuration and no known caller
    /// identity.
    #[must_use]
    pub fn new(transport: Arc<T>, cache: Arc<MessageCache>, clock: Arc<C>) -> Self {
        Self {
            transport,
            cache,
            clock,
            config: MutatorConfig::default(),
            identity: None,
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: MutatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Declares the account the transport authenticates as.
    ///
    /// With an identity, edits of messages authored by someone else are
    /// rejected locally instead of being sent.
    #[must_use]
    pub fn with_identity(mut self, identity: UserId) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &MutatorConfig {
        &self.config
    }

    /// Returns the cache entities are observed into.
    #[must_use]
    pub const fn cache(&self) -> &Arc<MessageCache> {
        &self.cache
    }

    /// Caches a message snapshot and returns a handle to it.
    #[must_use]
    pub fn observe(self: &Arc<Self>, snapshot: MessageSnapshot) -> MessageHandle<T, C> {
        let entry = self.cache.observe(snapshot);
        MessageHandle::new(Arc::clone(self), entry)
    }

    /// Returns a handle to a cached message.
    #[must_use]
    pub fn lookup(self: &Arc<Self>, id: &MessageId) -> Option<MessageHandle<T, C>> {
        self.cache
            .get(id)
            .map(|entry| MessageHandle::new(Arc::clone(self), entry))
    }

    /// Sends `text` to the entry's channel, prefixed with a mention of its
    /// author. The entry itself is not modified; the sent message is cached.
    ///
    /// Not idempotent: reissuing after a remote failure may post twice.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::EntityGone`] for a deleted entry, or the
    /// transport outcome mapped onto [`MessageError`].
    pub async fn reply(
        &self,
        entry: &MessageEntry,
        text: &str,
        policy: RateLimitPolicy,
    ) -> MessageResult<()> {
        let (channel_id, author_id) =
            entry.read(|record| (record.channel_id().clone(), record.author_id().clone()));
        let content = format!("{}, {text}", author_id.mention());

        let sent = self
            .dispatch(
                Operation::Reply,
                entry,
                policy,
                || self.transport.send_message(&channel_id, &content),
                |_, snapshot| Ok(snapshot),
            )
            .await?;
        debug!(message_id = %sent.id, channel_id = %channel_id, "reply sent");
        self.cache.observe(sent);
        Ok(())
    }

    /// Replaces the entry's content and returns the record as it stood
    /// immediately after the edit was applied.
    ///
    /// Idempotent: reissuing the same edit converges on the same content.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InsufficientPermissions`] without contacting
    /// the service when the caller is known not to be the author,
    /// [`MessageError::EntityGone`] for a deleted entry, or the transport
    /// outcome mapped onto [`MessageError`].
    pub async fn edit(
        &self,
        entry: &MessageEntry,
        text: &str,
        policy: RateLimitPolicy,
    ) -> MessageResult<MessageRecord> {
        entry.read(MessageRecord::ensure_live)?;
        if let Some(identity) = &self.identity
            && entry.read(|record| record.author_id() != identity)
        {
            warn!(
                operation = %Operation::Edit,
                message_id = %entry.id(),
                "refusing to edit a message authored by another user"
            );
            return Err(MessageError::InsufficientPermissions {
                capability: Capability::Authorship,
            });
        }

        let (channel_id, message_id) = ids_of(entry);
        self.dispatch(
            Operation::Edit,
            entry,
            policy,
            || self.transport.edit_message(&channel_id, &message_id, text),
            |record, snapshot| {
                record.apply_edit(MessageEdit::from_snapshot(snapshot, self.clock.utc()))?;
                Ok(record.clone())
            },
        )
        .await
    }

    /// Deletes the message remotely, then marks the entry deleted and evicts
    /// it from the cache.
    ///
    /// Idempotent: deleting an already deleted message remotely succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::EntityGone`] for an entry already deleted
    /// locally, or the transport outcome mapped onto [`MessageError`].
    pub async fn delete(&self, entry: &MessageEntry, policy: RateLimitPolicy) -> MessageResult<()> {
        let (channel_id, message_id) = ids_of(entry);
        self.dispatch(
            Operation::Delete,
            entry,
            policy,
            || self.transport.delete_message(&channel_id, &message_id),
            |record, ()| {
                record.mark_deleted();
                Ok(())
            },
        )
        .await?;

        self.cache.evict(&message_id);
        info!(message_id = %message_id, channel_id = %channel_id, "message deleted");
        Ok(())
    }

    /// Marks the entry and every earlier cached message in its channel as
    /// read.
    ///
    /// Idempotent: acknowledging an already acknowledged entry succeeds
    /// without contacting the service.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::EntityGone`] for a deleted entry, or the
    /// transport outcome mapped onto [`MessageError`].
    pub async fn acknowledge(
        &self,
        entry: &MessageEntry,
        policy: RateLimitPolicy,
    ) -> MessageResult<()> {
        entry.read(MessageRecord::ensure_live)?;
        if entry.read(MessageRecord::is_acknowledged) {
            return Ok(());
        }

        let (channel_id, message_id) = ids_of(entry);
        let marker = self
            .dispatch(
                Operation::Acknowledge,
                entry,
                policy,
                || self.transport.acknowledge_message(&channel_id, &message_id),
                |record, ()| {
                    record.acknowledge()?;
                    Ok(ReadMarker {
                        message_id: record.id().clone(),
                        timestamp: record.timestamp(),
                    })
                },
            )
            .await?;

        let flagged = self.cache.acknowledge_through(&channel_id, marker);
        debug!(message_id = %message_id, channel_id = %channel_id, flagged, "read marker advanced");
        Ok(())
    }

    /// Issues `request` and applies its response to the entry.
    ///
    /// Operations that mutate the entity hold its mutation gate across the
    /// round-trip. The gate is released while sleeping out a rate limit, and
    /// the record lock is only taken while `apply` runs.
    async fn dispatch<R, O, F, Fut, A>(
        &self,
        operation: Operation,
        entry: &MessageEntry,
        policy: RateLimitPolicy,
        mut request: F,
        apply: A,
    ) -> MessageResult<O>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TransportResult<R>>,
        A: FnOnce(&mut MessageRecord, R) -> MessageResult<O>,
    {
        let mut retried = false;
        loop {
            let gate = if operation.mutates_entity() {
                Some(entry.lock_mutations().await)
            } else {
                None
            };
            entry.read(MessageRecord::ensure_live)?;

            debug!(operation = %operation, message_id = %entry.id(), retried, "dispatching request");
            match request().await {
                Ok(response) => {
                    let applied = entry.write(|record| apply(record, response));
                    drop(gate);
                    return applied;
                }
                Err(TransportError::RateLimited { retry_after })
                    if !retried && self.config.permits_retry(policy, retry_after) =>
                {
                    drop(gate);
                    warn!(
                        operation = %operation,
                        message_id = %entry.id(),
                        retry_after_ms = duration_ms(retry_after),
                        "rate limited; retrying once after the requested wait"
                    );
                    tokio::time::sleep(retry_after).await;
                    retried = true;
                }
                Err(err) => {
                    drop(gate);
                    log_failure(operation, entry.id(), &err);
                    return Err(err.into());
                }
            }
        }
    }
}

fn ids_of(entry: &MessageEntry) -> (ChannelId, MessageId) {
    entry.read(|record| (record.channel_id().clone(), record.id().clone()))
}

fn duration_ms(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn log_failure(operation: Operation, message_id: &MessageId, err: &TransportError) {
    match err {
        TransportError::PermissionDenied(capability) => warn!(
            operation = %operation,
            message_id = %message_id,
            capability = %capability,
            "request denied"
        ),
        TransportError::RateLimited { retry_after } => warn!(
            operation = %operation,
            message_id = %message_id,
            retry_after_ms = duration_ms(*retry_after),
            "rate limited"
        ),
        TransportError::Failure(cause) => warn!(
            operation = %operation,
            message_id = %message_id,
            idempotent = operation.is_idempotent(),
            error = %cause,
            "request failed"
        ),
    }
}
