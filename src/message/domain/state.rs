//! Lifecycle state of a cached message.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a cached message.
///
/// A message starts `Live` and moves to `Deleted` once a delete is confirmed,
/// either by a local call or by a push notification. `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageState {
    /// The message exists and accepts mutations.
    #[default]
    Live,
    /// The message has been deleted.
    Deleted,
}

impl MessageState {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Deleted => "deleted",
        }
    }

    /// Returns `true` if no transitions leave this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// Returns `true` if moving from `self` to `target` is permitted.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!((self, target), (Self::Live, Self::Deleted))
    }
}

impl fmt::Display for MessageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
