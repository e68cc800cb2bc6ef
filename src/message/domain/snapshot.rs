//! Server-side views of a message and of an edit to one.

use super::{Attachment, ChannelId, MessageId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The remote service's view of a message at one point in time.
///
/// Snapshots are returned by the transport when a message is sent or edited,
/// and are what the local cache is seeded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSnapshot {
    /// Message identifier.
    pub id: MessageId,
    /// Containing channel.
    pub channel_id: ChannelId,
    /// Author of the message.
    pub author_id: UserId,
    /// Text content.
    pub content: String,
    /// Mentioned users, in order.
    #[serde(default)]
    pub mentions: Vec<UserId>,
    /// Attached files, in order.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Creation instant.
    pub timestamp: DateTime<Utc>,
    /// Instant of the latest edit, if the message was ever edited.
    #[serde(default)]
    pub edited_timestamp: Option<DateTime<Utc>>,
    /// Whether the message pings everyone in the channel.
    #[serde(default)]
    pub mentions_everyone: bool,
}

impl MessageSnapshot {
    /// Creates a snapshot with no mentions, attachments, or edits.
    #[must_use]
    pub fn new(
        id: MessageId,
        channel_id: ChannelId,
        author_id: UserId,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            channel_id,
            author_id,
            content: content.into(),
            mentions: Vec::new(),
            attachments: Vec::new(),
            timestamp,
            edited_timestamp: None,
            mentions_everyone: false,
        }
    }

    /// Sets the mentioned users.
    #[must_use]
    pub fn with_mentions(mut self, mentions: impl IntoIterator<Item = UserId>) -> Self {
        self.mentions = mentions.into_iter().collect();
        self
    }

    /// Sets the attachments.
    #[must_use]
    pub fn with_attachments(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.attachments = attachments.into_iter().collect();
        self
    }

    /// Sets the edited instant.
    #[must_use]
    pub fn with_edited_timestamp(mut self, edited_timestamp: DateTime<Utc>) -> Self {
        self.edited_timestamp = Some(edited_timestamp);
        self
    }

    /// Sets whether the message pings everyone.
    #[must_use]
    pub fn with_mentions_everyone(mut self, everyone: bool) -> Self {
        self.mentions_everyone = everyone;
        self
    }
}

/// The field group replaced by a single edit.
///
/// Content, mentions, and edited instant always travel together so that a
/// reader never sees new content paired with a stale timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEdit {
    /// Replacement content.
    pub content: String,
    /// Replacement mention list.
    #[serde(default)]
    pub mentions: Vec<UserId>,
    /// Instant the edit took effect.
    pub edited_timestamp: DateTime<Utc>,
}

impl MessageEdit {
    /// Creates an edit.
    #[must_use]
    pub fn new(
        content: impl Into<String>,
        mentions: Vec<UserId>,
        edited_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            content: content.into(),
            mentions,
            edited_timestamp,
        }
    }

    /// Extracts the edit carried by a snapshot returned from an edit request.
    ///
    /// Falls back to `now` when the service did not report an edited instant.
    #[must_use]
    pub fn from_snapshot(snapshot: MessageSnapshot, now: DateTime<Utc>) -> Self {
        Self {
            edited_timestamp: snapshot.edited_timestamp.unwrap_or(now),
            content: snapshot.content,
            mentions: snapshot.mentions,
        }
    }
}
