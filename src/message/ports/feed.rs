//! Push-event feed port for server-initiated message notifications.

use crate::message::domain::{ChannelId, MessageEdit, MessageId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Source of push notifications about message changes.
///
/// A feed is lazy, unbounded, and cannot be restarted once drained. Events
/// are delivered at least once per underlying connection, so consumers must
/// tolerate duplicates.
#[async_trait]
pub trait PushEventFeed: Send {
    /// Waits for the next event, returning `None` once the feed has ended.
    async fn next_event(&mut self) -> Option<PushEvent>;
}

/// Kind of change a push event announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushEventKind {
    /// The message content was edited.
    Edit,
    /// The message was deleted.
    Delete,
}

/// Change carried by a push event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEventBody {
    /// Authoritative replacement of the edited field group.
    Edit(MessageEdit),
    /// The message no longer exists.
    Delete,
}

/// A server-pushed notification about one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEvent {
    /// Channel containing the message.
    pub channel_id: ChannelId,
    /// Message the event concerns.
    pub message_id: MessageId,
    /// The announced change.
    pub body: PushEventBody,
}

/// Wire shape of a push event.
#[derive(Debug, Deserialize)]
struct RawPushEvent {
    kind: PushEventKind,
    channel_id: ChannelId,
    message_id: MessageId,
    #[serde(default)]
    payload: Option<MessageEdit>,
}

impl PushEvent {
    /// Creates an edit notification.
    #[must_use]
    pub const fn edit(channel_id: ChannelId, message_id: MessageId, edit: MessageEdit) -> Self {
        Self {
            channel_id,
            message_id,
            body: PushEventBody::Edit(edit),
        }
    }

    /// Creates a delete notification.
    #[must_use]
    pub const fn delete(channel_id: ChannelId, message_id: MessageId) -> Self {
        Self {
            channel_id,
            message_id,
            body: PushEventBody::Delete,
        }
    }

    /// Returns the kind of change announced.
    #[must_use]
    pub const fn kind(&self) -> PushEventKind {
        match self.body {
            PushEventBody::Edit(_) => PushEventKind::Edit,
            PushEventBody::Delete => PushEventKind::Delete,
        }
    }

    /// Decodes an event from its JSON form.
    ///
    /// ```json
    /// { "kind": "edit", "channel_id": "7", "message_id": "42",
    ///   "payload": { "content": "hi", "mentions": [], "edited_timestamp": "2026-01-01T00:00:00Z" } }
    /// { "kind": "delete", "channel_id": "7", "message_id": "42" }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Decode`] when the JSON is malformed or an edit
    /// event carries no payload.
    pub fn from_json(raw: &str) -> Result<Self, FeedError> {
        let decoded: RawPushEvent =
            serde_json::from_str(raw).map_err(|err| FeedError::Decode(err.to_string()))?;
        let body = match (decoded.kind, decoded.payload) {
            (PushEventKind::Edit, Some(edit)) => PushEventBody::Edit(edit),
            (PushEventKind::Edit, None) => {
                return Err(FeedError::Decode("edit event without payload".to_owned()));
            }
            (PushEventKind::Delete, _) => PushEventBody::Delete,
        };
        Ok(Self {
            channel_id: decoded.channel_id,
            message_id: decoded.message_id,
            body,
        })
    }
}

/// Errors raised by push-feed adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    /// The consuming side of the feed has gone away.
    #[error("push feed is closed")]
    Closed,

    /// An event could not be decoded.
    #[error("malformed push event: {0}")]
    Decode(String),
}
