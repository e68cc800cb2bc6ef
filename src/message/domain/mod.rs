//! Domain types for the message subsystem.
//!
//! This module contains pure domain types with no infrastructure
//! dependencies. Identifiers and attachments are immutable values; the
//! [`MessageRecord`] aggregate enforces the lifecycle rules of a cached
//! message.

mod attachment;
mod capability;
mod error;
mod ids;
mod mentions;
mod operation;
mod record;
mod snapshot;
mod state;

pub use attachment::Attachment;
pub use capability::Capability;
pub use error::MessageDomainError;
pub use ids::{AttachmentId, ChannelId, MessageId, UserId};
pub use mentions::{ParsedMentions, parse_mentions};
pub use operation::Operation;
pub use record::MessageRecord;
pub use snapshot::{MessageEdit, MessageSnapshot};
pub use state::MessageState;
