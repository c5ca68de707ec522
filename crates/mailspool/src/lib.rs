//! # mailspool
//!
//! An embeddable SMTP submission client for hosts that produce email
//! faster than it can be sent. Emails are queued, throttled, retried on
//! failure, and abandoned once their delivery timeout is spent — all
//! without blocking the host's event loop.
//!
//! The client owns no sockets and spawns no threads. The host supplies a
//! non-blocking [`Transport`] and drives the client from its own event
//! loop: call [`Client::kick`] when new work may be ready,
//! [`Client::on_readable`] / [`Client::on_writable`] on transport
//! readiness, and [`Client::on_timer`] when [`Client::next_deadline`]
//! arrives. The protocol itself lives in the [`mailspool-smtp`] crate.
//!
//! Every accepted email resolves through its completion callback exactly
//! once, with a terminal [`DeliveryStatus`]: delivered, timed out, or
//! cancelled by [`Client::close`].
//!
//! ```no_run
//! use std::time::{Duration, Instant};
//! use mailspool::{Client, ClientConfig, Email};
//! # struct NullTransport;
//! # impl mailspool::Transport for NullTransport {
//! #     fn open(&mut self) -> std::io::Result<()> { Ok(()) }
//! #     fn write(&mut self, buf: &[u8]) -> std::io::Result<mailspool::IoOutcome> {
//! #         Ok(mailspool::IoOutcome::Ready(buf.len()))
//! #     }
//! #     fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<mailspool::IoOutcome> {
//! #         Ok(mailspool::IoOutcome::WouldBlock)
//! #     }
//! #     fn close(&mut self) {}
//! # }
//! # fn transport() -> NullTransport { NullTransport }
//!
//! # fn main() -> mailspool::Result<()> {
//! let config = ClientConfig {
//!     helo: "app.example.com".to_string(),
//!     retry_interval: Duration::from_secs(60),
//!     delivery_timeout: Duration::from_secs(3600),
//!     ..ClientConfig::default()
//! };
//! let mut client = Client::new(config, transport())?;
//!
//! let email = Email::new(
//!     "app@example.com",
//!     "ops@example.net",
//!     b"Subject: report\r\n\r\ndone.\r\n",
//!     b"",
//!     |email, delivery| {
//!         println!("{:?}: {:?}", delivery.status, email.extra());
//!     },
//! )?;
//! client.add_email(email, Instant::now())?;
//! client.kick(Instant::now());
//! # Ok(())
//! # }
//! ```
//!
//! [`mailspool-smtp`]: mailspool_smtp

#![forbid(unsafe_code)]

mod client;
mod email;
mod error;
mod queue;
mod supervisor;
pub mod transport;

pub use client::{Client, ClientConfig};
pub use email::{Completion, Delivery, DeliveryStatus, Email};
pub use error::{Error, Result};
pub use transport::{IoOutcome, Transport};

pub use mailspool_smtp as smtp;
