//! Error types for message domain rules.

use super::MessageId;
use thiserror::Error;

/// Errors raised when a domain rule rejects a change to a message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessageDomainError {
    /// The message has been deleted and accepts no further changes.
    #[error("message {0} has been deleted")]
    Deleted(MessageId),
}
