//! # mailspool-smtp
//!
//! Sans-I/O SMTP submission protocol engine.
//!
//! This crate implements the protocol half of the mailspool client: command
//! serialization, reply parsing, and the per-connection session state
//! machine. It performs no I/O; the caller owns the transport and feeds
//! bytes in, acting on the actions the session hands back.
//!
//! ## Quick Start
//!
//! ```
//! use mailspool_smtp::{Action, Address, ReplyReader, Session};
//!
//! # fn main() -> mailspool_smtp::Result<()> {
//! let mut session = Session::new(
//!     "client.example.com".to_string(),
//!     Address::new("alice@example.com")?,
//!     Address::new("bob@example.net")?,
//!     false,
//! );
//! let mut reader = ReplyReader::new();
//!
//! // Bytes arrive from the transport in arbitrary fragments.
//! reader.feed(b"220 mail.example.net ready\r\n")?;
//! while let Some(reply) = reader.next_reply() {
//!     match session.on_reply(&reply)? {
//!         Action::Send(bytes) => { /* write bytes to the transport */ }
//!         Action::SendBody => { /* stream body + END_OF_DATA */ }
//!         Action::Finish { quit, reply } => { /* write quit, report success */ }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`command`]: SMTP command builders
//! - [`parser`]: Incremental, bounded reply parser
//! - [`session`]: Submission session state machine
//! - [`types`]: Core SMTP types (addresses, replies)

#![forbid(unsafe_code)]

pub mod command;
mod error;
pub mod parser;
pub mod session;
pub mod types;

pub use command::Command;
pub use error::{Error, Result};
pub use parser::ReplyReader;
pub use session::{Action, END_OF_DATA, Session, SessionState};
pub use types::{Address, Reply, ReplyCode};
