//! Abstract non-blocking transport consumed by the client.
//!
//! The client speaks SMTP over whatever byte stream the host provides:
//! plain TCP, a TLS session established elsewhere, a Unix socket. The
//! transport is already addressed at construction time; the client only
//! opens, moves bytes, and closes. All calls are non-blocking — readiness
//! is delivered by the host invoking the client's `on_readable` /
//! `on_writable` entry points.

use std::io;

/// Outcome of a non-blocking read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOutcome {
    /// The operation transferred this many bytes.
    Ready(usize),
    /// The operation would block; retry on the next readiness event.
    WouldBlock,
    /// The peer closed the stream (read side only).
    Closed,
}

/// Pluggable byte-stream transport.
///
/// Lower-level concerns — connect timeouts, TLS, certificate handling —
/// belong to the implementation and surface here as ordinary I/O errors.
pub trait Transport {
    /// Begins establishing a connection to the configured endpoint.
    ///
    /// Completion is signaled through the host's readiness notifications;
    /// the server greeting arriving readable is the first sign of life the
    /// client acts on.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be initiated.
    fn open(&mut self) -> io::Result<()>;

    /// Writes bytes, accepting as many as fit without blocking.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream has failed.
    fn write(&mut self, buf: &[u8]) -> io::Result<IoOutcome>;

    /// Reads available bytes into `buf` without blocking.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream has failed.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<IoOutcome>;

    /// Releases the connection. Must be safe to call in any state.
    fn close(&mut self);
}
