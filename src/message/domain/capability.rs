//! Capabilities a caller may lack when mutating a message.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A permission the remote service checks before applying a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Posting new messages into a channel.
    SendMessages,
    /// Deleting messages authored by other users.
    ManageMessages,
    /// Reading the channel history, required to acknowledge messages.
    ReadMessageHistory,
    /// Being the author of the message. Only authors may edit.
    Authorship,
}

impl Capability {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SendMessages => "send_messages",
            Self::ManageMessages => "manage_messages",
            Self::ReadMessageHistory => "read_message_history",
            Self::Authorship => "authorship",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
