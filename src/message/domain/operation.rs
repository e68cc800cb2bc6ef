//! The mutating operations a message supports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A remote mutation issued on behalf of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Post a new message mentioning the author.
    Reply,
    /// Replace the content of the message.
    Edit,
    /// Remove the message.
    Delete,
    /// Mark the message and everything before it as read.
    Acknowledge,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 4] = [Self::Reply, Self::Edit, Self::Delete, Self::Acknowledge];

    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reply => "reply",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Acknowledge => "acknowledge",
        }
    }

    /// Returns `true` when repeating the operation with the same arguments
    /// yields the same end state as issuing it once.
    ///
    /// Replies post a new message each time and are therefore never
    /// idempotent.
    #[must_use]
    pub const fn is_idempotent(self) -> bool {
        !matches!(self, Self::Reply)
    }

    /// Returns `true` when the operation mutates the entity it is issued on,
    /// and so must be serialised with other mutations of that entity.
    #[must_use]
    pub const fn mutates_entity(self) -> bool {
        !matches!(self, Self::Reply)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
