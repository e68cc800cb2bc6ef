//! The cached message aggregate.
//!
//! A [`MessageRecord`] is the local copy of a server-held message. It carries
//! no locking of its own; the services layer wraps it for shared access.

use super::{
    Attachment, ChannelId, MessageDomainError, MessageEdit, MessageId, MessageSnapshot,
    MessageState, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Local cached state of a single message.
///
/// # Invariants
///
/// - `id`, `channel_id`, `author_id`, `attachments`, and `timestamp` never
///   change after construction
/// - `edited_timestamp`, when present, is never earlier than `timestamp`
/// - `acknowledged` only moves from `false` to `true`
/// - content changes always come with a new `edited_timestamp`
/// - once `Deleted`, the record accepts no further edits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    id: MessageId,
    channel_id: ChannelId,
    author_id: UserId,
    content: String,
    mentions: Vec<UserId>,
    attachments: Vec<Attachment>,
    timestamp: DateTime<Utc>,
    edited_timestamp: Option<DateTime<Utc>>,
    mentions_everyone: bool,
    acknowledged: bool,
    state: MessageState,
    revision: u64,
}

impl MessageRecord {
    /// Builds a live, unacknowledged record from a server snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: MessageSnapshot) -> Self {
        let edited_timestamp = snapshot
            .edited_timestamp
            .map(|edited| edited.max(snapshot.timestamp));
        Self {
            id: snapshot.id,
            channel_id: snapshot.channel_id,
            author_id: snapshot.author_id,
            content: snapshot.content,
            mentions: snapshot.mentions,
            attachments: snapshot.attachments,
            timestamp: snapshot.timestamp,
            edited_timestamp,
            mentions_everyone: snapshot.mentions_everyone,
            acknowledged: false,
            state: MessageState::Live,
            revision: 0,
        }
    }

    /// Returns the message identifier.
    #[must_use]
    pub const fn id(&self) -> &MessageId {
        &self.id
    }

    /// Returns the containing channel.
    #[must_use]
    pub const fn channel_id(&self) -> &ChannelId {
        &self.channel_id
    }

    /// Returns the author.
    #[must_use]
    pub const fn author_id(&self) -> &UserId {
        &self.author_id
    }

    /// Returns the text content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the mentioned users.
    #[must_use]
    pub fn mentions(&self) -> &[UserId] {
        &self.mentions
    }

    /// Returns the attachments.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Returns the creation instant.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the instant of the latest edit.
    #[must_use]
    pub const fn edited_timestamp(&self) -> Option<DateTime<Utc>> {
        self.edited_timestamp
    }

    /// Returns whether the message pings everyone.
    #[must_use]
    pub const fn mentions_everyone(&self) -> bool {
        self.mentions_everyone
    }

    /// Returns whether this account has read the message.
    #[must_use]
    pub const fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> MessageState {
        self.state
    }

    /// Returns `true` once the message has been deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.state.is_terminal()
    }

    /// Returns how many content changes have been applied since the record
    /// was first observed.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Fails if the record no longer accepts mutations.
    ///
    /// # Errors
    ///
    /// Returns [`MessageDomainError::Deleted`] once the record is deleted.
    pub fn ensure_live(&self) -> Result<(), MessageDomainError> {
        if self.is_deleted() {
            return Err(MessageDomainError::Deleted(self.id.clone()));
        }
        Ok(())
    }

    /// Replaces content, mentions, and edited instant in one step.
    ///
    /// Edited instants earlier than the creation instant are clamped to it.
    /// Reapplying an identical edit changes nothing and returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`MessageDomainError::Deleted`] if the record is deleted.
    pub fn apply_edit(&mut self, edit: MessageEdit) -> Result<bool, MessageDomainError> {
        self.ensure_live()?;

        let edited_timestamp = edit.edited_timestamp.max(self.timestamp);
        if self.content == edit.content
            && self.mentions == edit.mentions
            && self.edited_timestamp == Some(edited_timestamp)
        {
            return Ok(false);
        }

        self.content = edit.content;
        self.mentions = edit.mentions;
        self.edited_timestamp = Some(edited_timestamp);
        self.revision = self.revision.saturating_add(1);
        Ok(true)
    }

    /// Moves the record to the terminal `Deleted` state.
    ///
    /// Returns `false` if the record was already deleted.
    pub fn mark_deleted(&mut self) -> bool {
        if !self.state.can_transition_to(MessageState::Deleted) {
            return false;
        }
        self.state = MessageState::Deleted;
        true
    }

    /// Flags the record as read.
    ///
    /// Returns `false` if it was already acknowledged.
    ///
    /// # Errors
    ///
    /// Returns [`MessageDomainError::Deleted`] if the record is deleted.
    pub fn acknowledge(&mut self) -> Result<bool, MessageDomainError> {
        self.ensure_live()?;
        if self.acknowledged {
            return Ok(false);
        }
        self.acknowledged = true;
        Ok(true)
    }
}
