//! Transport port for authenticated requests against the remote service.

use crate::message::domain::{Capability, ChannelId, MessageId, MessageSnapshot};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Request/response contract with the remote message service.
///
/// Implementations issue exactly one request per call and never retry on
/// their own; retry policy belongs to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Posts a new message into a channel.
    async fn send_message(
        &self,
        channel_id: &ChannelId,
        content: &str,
    ) -> TransportResult<MessageSnapshot>;

    /// Replaces the content of an existing message.
    async fn edit_message(
        &self,
        channel_id: &ChannelId,
        message_id: &MessageId,
        content: &str,
    ) -> TransportResult<MessageSnapshot>;

    /// Deletes a message.
    async fn delete_message(
        &self,
        channel_id: &ChannelId,
        message_id: &MessageId,
    ) -> TransportResult<()>;

    /// Marks a message and everything before it in the channel as read.
    async fn acknowledge_message(
        &self,
        channel_id: &ChannelId,
        message_id: &MessageId,
    ) -> TransportResult<()>;
}

/// Errors returned by transport implementations.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The service refused the request for lack of a capability.
    #[error("permission denied: missing {0}")]
    PermissionDenied(Capability),

    /// The service throttled the request.
    #[error("rate limited for {}ms", retry_after.as_millis())]
    RateLimited {
        /// Wait required before the request may be reissued.
        retry_after: Duration,
    },

    /// The request failed in transit or the service returned an error.
    #[error("transport failure: {0}")]
    Failure(Arc<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Creates a rate-limit signal.
    #[must_use]
    pub const fn rate_limited(retry_after: Duration) -> Self {
        Self::RateLimited { retry_after }
    }

    /// Wraps a transport failure.
    pub fn failure(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Failure(Arc::new(err))
    }
}
