//! File attachments carried by a message.

use super::AttachmentId;
use serde::{Deserialize, Serialize};

/// A file reference attached to a message.
///
/// Attachments are immutable once constructed and have no lifecycle of their
/// own; they live and die with the message that carries them.
///
/// # Examples
///
/// ```
/// use herald::message::domain::{Attachment, AttachmentId};
///
/// let attachment = Attachment::new(
///     "build.log",
///     2048,
///     AttachmentId::new("991"),
///     "https://cdn.example.test/attachments/991/build.log",
/// );
/// assert_eq!(attachment.filesize(), 2048);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attachment {
    filename: String,
    filesize: u64,
    id: AttachmentId,
    url: String,
}

impl Attachment {
    /// Creates an attachment description.
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        filesize: u64,
        id: AttachmentId,
        url: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            filesize,
            id,
            url: url.into(),
        }
    }

    /// Returns the file name.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Returns the size of the file in bytes.
    #[must_use]
    pub const fn filesize(&self) -> u64 {
        self.filesize
    }

    /// Returns the attachment identifier.
    #[must_use]
    pub const fn id(&self) -> &AttachmentId {
        &self.id
    }

    /// Returns the download link.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}
