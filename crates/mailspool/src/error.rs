//! Error types for the mailspool client.

use crate::email::Email;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Client errors.
///
/// Rejections that consume an [`Email`] carry the record back so the
/// caller keeps ownership; see [`Error::into_email`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration rejected at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// Invalid email address.
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// The queue is at its configured depth.
    #[error("email queue is at capacity")]
    QueueFull(Email),

    /// The payload exceeds the configured maximum content size.
    #[error("message is {size} bytes, exceeds the {limit} byte limit")]
    MessageTooLarge {
        /// The rejected record.
        email: Email,
        /// Payload size in bytes.
        size: usize,
        /// Configured maximum content size.
        limit: usize,
    },
}

impl Error {
    /// Recovers the email record from a rejection, if the error holds one.
    ///
    /// The record is untouched: its completion callback has not fired and
    /// it may be resubmitted later.
    #[must_use]
    pub fn into_email(self) -> Option<Email> {
        match self {
            Self::QueueFull(email) | Self::MessageTooLarge { email, .. } => Some(email),
            Self::InvalidConfig(_) | Self::InvalidAddress(_) => None,
        }
    }
}
