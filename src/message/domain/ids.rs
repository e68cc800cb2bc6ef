//! Opaque identifier newtypes for messages, channels, users, and attachments.
//!
//! Remote services hand out identifiers as strings (snowflakes, UUIDs, or
//! anything else). Wrapping each kind in its own type prevents a channel
//! identifier from being passed where a message identifier is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a remote identifier.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier, returning the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(
    /// Identifier of a message, assigned by the remote service.
    ///
    /// # Examples
    ///
    /// ```
    /// use herald::message::domain::MessageId;
    ///
    /// let id = MessageId::new("1234");
    /// assert_eq!(id.as_str(), "1234");
    /// ```
    MessageId
);

opaque_id!(
    /// Identifier of the channel a message belongs to.
    ChannelId
);

opaque_id!(
    /// Identifier of a user (message author or mentioned user).
    UserId
);

opaque_id!(
    /// Identifier of a file attached to a message.
    AttachmentId
);

impl UserId {
    /// Renders the user as an in-text mention.
    ///
    /// # Examples
    ///
    /// ```
    /// use herald::message::domain::UserId;
    ///
    /// assert_eq!(UserId::new("42").mention(), "<@42>");
    /// ```
    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}
