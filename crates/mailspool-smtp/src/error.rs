//! Error types for the SMTP protocol layer.

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed server reply.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Server reply outside the accepted class for the current step.
    #[error("Unexpected reply while {state}: {line}")]
    UnexpectedReply {
        /// Session step the reply arrived in.
        state: &'static str,
        /// Final line of the offending reply, code included.
        line: String,
    },

    /// Accumulated reply exceeded the buffering limit.
    #[error("Reply exceeds {limit} byte limit")]
    ReplyTooLong {
        /// The configured buffering limit in bytes.
        limit: usize,
    },

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// A reply was fed to a session that already reached a terminal state.
    #[error("Session already reached a terminal state")]
    SessionFinished,
}

impl Error {
    /// Returns the final reply line captured with the error, if any.
    ///
    /// Used by callers that report the server's last words alongside a
    /// failed delivery.
    #[must_use]
    pub fn reply_line(&self) -> Option<&str> {
        match self {
            Self::UnexpectedReply { line, .. } => Some(line),
            _ => None,
        }
    }
}
