//! Caller-facing handle to a cached message.

use super::{MessageEntry, RateLimitPolicy, RemoteMutator};
use crate::message::{
    domain::{Attachment, ChannelId, MessageId, MessageRecord, MessageState, UserId},
    error::MessageResult,
    ports::MessageTransport,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;

/// A cached message together with the means to mutate it remotely.
///
/// Reads return the current cached state, which may lag behind the remote
/// service. Use [`MessageHandle::snapshot`] when several fields must be read
/// consistently.
pub struct MessageHandle<T, C>
where
    T: MessageTransport,
    C: Clock + Send + Sync,
{
    mutator: Arc<RemoteMutator<T, C>>,
    entry: Arc<MessageEntry>,
    policy: RateLimitPolicy,
}

impl<T, C> Clone for MessageHandle<T, C>
where
    T: MessageTransport,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            mutator: Arc::clone(&self.mutator),
            entry: Arc::clone(&self.entry),
            policy: self.policy,
        }
    }
}

impl<T, C> MessageHandle<T, C>
where
    T: MessageTransport,
    C: Clock + Send + Sync,
{
    /// Creates a handle using the mutator's configured rate-limit policy.
    #[must_use]
    pub fn new(mutator: Arc<RemoteMutator<T, C>>, entry: Arc<MessageEntry>) -> Self {
        let policy = mutator.config().rate_limit;
        Self {
            mutator,
            entry,
            policy,
        }
    }

    /// Returns a handle to the same message that applies `policy` to every
    /// subsequent call.
    #[must_use]
    pub fn with_rate_limit_policy(&self, policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            ..self.clone()
        }
    }

    /// Returns the rate-limit policy this handle applies.
    #[must_use]
    pub const fn rate_limit_policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Returns the shared cache entry.
    #[must_use]
    pub const fn entry(&self) -> &Arc<MessageEntry> {
        &self.entry
    }

    /// Returns a consistent copy of every field.
    #[must_use]
    pub fn snapshot(&self) -> MessageRecord {
        self.entry.snapshot()
    }

    /// Returns the message identifier.
    #[must_use]
    pub fn id(&self) -> MessageId {
        self.entry.id().clone()
    }

    /// Returns the text content.
    #[must_use]
    pub fn content(&self) -> String {
        self.entry.read(|record| record.content().to_owned())
    }

    /// Returns the containing channel.
    #[must_use]
    pub fn channel(&self) -> ChannelId {
        self.entry.read(|record| record.channel_id().clone())
    }

    /// Returns the author.
    #[must_use]
    pub fn author(&self) -> UserId {
        self.entry.read(|record| record.author_id().clone())
    }

    /// Returns the creation instant.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.entry.read(MessageRecord::timestamp)
    }

    /// Returns the instant of the latest edit.
    #[must_use]
    pub fn edited_timestamp(&self) -> Option<DateTime<Utc>> {
        self.entry.read(MessageRecord::edited_timestamp)
    }

    /// Returns the mentioned users.
    #[must_use]
    pub fn mentions(&self) -> Vec<UserId> {
        self.entry.read(|record| record.mentions().to_vec())
    }

    /// Returns the attachments.
    #[must_use]
    pub fn attachments(&self) -> Vec<Attachment> {
        self.entry.read(|record| record.attachments().to_vec())
    }

    /// Returns whether the message pings everyone.
    #[must_use]
    pub fn mentions_everyone(&self) -> bool {
        self.entry.read(MessageRecord::mentions_everyone)
    }

    /// Returns whether this account has read the message.
    #[must_use]
    pub fn is_acknowledged(&self) -> bool {
        self.entry.read(MessageRecord::is_acknowledged)
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> MessageState {
        self.entry.read(MessageRecord::state)
    }

    /// Returns `true` once the message has been deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.entry.read(MessageRecord::is_deleted)
    }

    /// Replies in the same channel, mentioning the author.
    ///
    /// Not idempotent. Rate limits follow this handle's policy.
    ///
    /// # Errors
    ///
    /// See [`RemoteMutator::reply`].
    pub async fn reply(&self, text: &str) -> MessageResult<()> {
        self.mutator.reply(&self.entry, text, self.policy).await
    }

    /// Replaces the content, returning the record right after the edit.
    ///
    /// Idempotent. Rate limits follow this handle's policy.
    ///
    /// # Errors
    ///
    /// See [`RemoteMutator::edit`].
    pub async fn edit(&self, text: &str) -> MessageResult<MessageRecord> {
        self.mutator.edit(&self.entry, text, self.policy).await
    }

    /// Deletes the message.
    ///
    /// Idempotent. Rate limits follow this handle's policy.
    ///
    /// # Errors
    ///
    /// See [`RemoteMutator::delete`].
    pub async fn delete(&self) -> MessageResult<()> {
        self.mutator.delete(&self.entry, self.policy).await
    }

    /// Marks the message and everything before it as read.
    ///
    /// Idempotent. Rate limits follow this handle's policy.
    ///
    /// # Errors
    ///
    /// See [`RemoteMutator::acknowledge`].
    pub async fn acknowledge(&self) -> MessageResult<()> {
        self.mutator.acknowledge(&self.entry, self.policy).await
    }
}
