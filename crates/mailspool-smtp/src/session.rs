//! Sans-I/O SMTP submission session.
//!
//! The session drives one email through the submission command sequence
//! without performing any I/O itself. The caller connects the transport,
//! feeds each parsed server [`Reply`] into [`Session::on_reply`], and acts
//! on the returned [`Action`]: transmit command bytes, stream the message
//! body, or finish. Any reply outside the accepted class for the current
//! step fails the session.

use tracing::trace;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::types::{Address, Reply};

/// Bytes appended after the message body to terminate the DATA phase.
pub const END_OF_DATA: &[u8] = b"\r\n.\r\n";

/// Step the session is currently waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connection established, waiting for the 220 greeting.
    WaitGreeting,
    /// HELO/EHLO sent, waiting for acknowledgment.
    WaitHeloAck,
    /// MAIL FROM sent, waiting for acknowledgment.
    WaitMailAck,
    /// RCPT TO sent, waiting for acknowledgment.
    WaitRcptAck,
    /// DATA sent, waiting for the 354 prompt.
    WaitDataPrompt,
    /// Body transmitted, waiting for the final acknowledgment.
    WaitFinalAck,
    /// Delivery acknowledged and QUIT issued.
    Closed,
    /// A reply failed the session.
    Failed,
}

impl SessionState {
    const fn describe(self) -> &'static str {
        match self {
            Self::WaitGreeting => "waiting for greeting",
            Self::WaitHeloAck => "waiting for HELO acknowledgment",
            Self::WaitMailAck => "waiting for MAIL FROM acknowledgment",
            Self::WaitRcptAck => "waiting for RCPT TO acknowledgment",
            Self::WaitDataPrompt => "waiting for DATA prompt",
            Self::WaitFinalAck => "waiting for final acknowledgment",
            Self::Closed => "closed",
            Self::Failed => "failed",
        }
    }
}

/// What the caller must do next after a reply was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Transmit these command bytes, then await the next reply.
    Send(Vec<u8>),
    /// Stream the message body followed by [`END_OF_DATA`], then await the
    /// final acknowledgment.
    SendBody,
    /// Delivery succeeded. Transmit the QUIT bytes (best effort, no reply
    /// expected) and close the connection; `reply` is the server's final
    /// acknowledgment.
    Finish {
        /// Serialized QUIT command.
        quit: Vec<u8>,
        /// Final server acknowledgment for the delivery.
        reply: Reply,
    },
}

/// Protocol state machine for one delivery attempt.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    greeting: Command,
    from: Address,
    to: Address,
}

impl Session {
    /// Creates a session for one email, starting at the greeting wait.
    ///
    /// `use_ehlo` selects EHLO over the plain HELO verb; the session makes
    /// no use of the advertised extensions either way.
    #[must_use]
    pub const fn new(helo_hostname: String, from: Address, to: Address, use_ehlo: bool) -> Self {
        let greeting = if use_ehlo {
            Command::Ehlo {
                hostname: helo_hostname,
            }
        } else {
            Command::Helo {
                hostname: helo_hostname,
            }
        };
        Self {
            state: SessionState::WaitGreeting,
            greeting,
            from,
            to,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns true if the session reached a terminal state.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Closed | SessionState::Failed)
    }

    /// Advances the session with a parsed server reply.
    ///
    /// # Errors
    ///
    /// Returns an error, and moves the session to `Failed`, if the reply
    /// code is outside the accepted class for the current step. Returns
    /// [`Error::SessionFinished`] if called after a terminal state.
    pub fn on_reply(&mut self, reply: &Reply) -> Result<Action> {
        trace!(state = ?self.state, code = %reply.code, "reply");

        let action = match self.state {
            SessionState::WaitGreeting if reply.is_success() => {
                self.state = SessionState::WaitHeloAck;
                Action::Send(self.greeting.serialize())
            }
            SessionState::WaitHeloAck if reply.is_success() => {
                self.state = SessionState::WaitMailAck;
                Action::Send(
                    Command::MailFrom {
                        from: self.from.clone(),
                    }
                    .serialize(),
                )
            }
            SessionState::WaitMailAck if reply.is_success() => {
                self.state = SessionState::WaitRcptAck;
                Action::Send(
                    Command::RcptTo {
                        to: self.to.clone(),
                    }
                    .serialize(),
                )
            }
            SessionState::WaitRcptAck if reply.is_success() => {
                self.state = SessionState::WaitDataPrompt;
                Action::Send(Command::Data.serialize())
            }
            SessionState::WaitDataPrompt if reply.code.is_intermediate() => {
                self.state = SessionState::WaitFinalAck;
                Action::SendBody
            }
            SessionState::WaitFinalAck if reply.is_success() => {
                self.state = SessionState::Closed;
                Action::Finish {
                    quit: Command::Quit.serialize(),
                    reply: reply.clone(),
                }
            }
            SessionState::Closed | SessionState::Failed => {
                return Err(Error::SessionFinished);
            }
            state => {
                self.state = SessionState::Failed;
                return Err(Error::UnexpectedReply {
                    state: state.describe(),
                    line: reply.last_line(),
                });
            }
        };

        Ok(action)
    }
}
