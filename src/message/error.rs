//! Caller-facing error taxonomy for message operations.
//!
//! Every failed mutating call surfaces exactly one of these variants and
//! leaves the cached entity unchanged.

use super::{
    domain::{Capability, MessageDomainError, MessageId, Operation},
    ports::transport::TransportError,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for message operations.
pub type MessageResult<T> = Result<T, MessageError>;

/// Errors returned by message operations.
#[derive(Debug, Clone, Error)]
pub enum MessageError {
    /// The caller lacks a capability the operation requires.
    #[error("missing capability: {capability}")]
    InsufficientPermissions {
        /// The capability that was missing.
        capability: Capability,
    },

    /// The remote service asked the caller to wait before retrying.
    #[error("rate limited, retry after {}ms", retry_after.as_millis())]
    RateLimited {
        /// How long to wait before the next attempt.
        retry_after: Duration,
    },

    /// The transport or the remote service failed.
    #[error("remote failure: {0}")]
    RemoteFailure(Arc<dyn std::error::Error + Send + Sync>),

    /// The message has been deleted.
    #[error("message {0} is gone")]
    EntityGone(MessageId),
}

impl MessageError {
    /// Returns `true` if the caller may safely reissue `operation` after this
    /// error.
    ///
    /// Permission and entity-gone errors never become retryable. Rate limits
    /// are retryable once the wait has elapsed. Remote failures are only
    /// retryable for idempotent operations, since a non-idempotent request
    /// may have been applied before the failure was observed.
    #[must_use]
    pub const fn is_retryable(&self, operation: Operation) -> bool {
        match self {
            Self::InsufficientPermissions { .. } | Self::EntityGone(_) => false,
            Self::RateLimited { .. } => true,
            Self::RemoteFailure(_) => operation.is_idempotent(),
        }
    }
}

impl From<MessageDomainError> for MessageError {
    fn from(err: MessageDomainError) -> Self {
        match err {
            MessageDomainError::Deleted(id) => Self::EntityGone(id),
        }
    }
}

impl From<TransportError> for MessageError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::PermissionDenied(capability) => {
                Self::InsufficientPermissions { capability }
            }
            TransportError::RateLimited { retry_after } => Self::RateLimited { retry_after },
            TransportError::Failure(cause) => Self::RemoteFailure(cause),
        }
    }
}
