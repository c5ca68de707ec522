//! Email record and delivery completion.

use std::time::Instant;

use mailspool_smtp::Address;

use crate::error::{Error, Result};

/// Terminal status of one email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// The server acknowledged the message.
    Delivered,
    /// The delivery timeout elapsed before any attempt succeeded.
    TimedOut,
    /// The client was closed while the email was still held.
    Cancelled,
}

/// Outcome handed to an email's completion callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Terminal status.
    pub status: DeliveryStatus,
    /// Final server response line on success, or whatever partial response
    /// was captured on failure. May be empty.
    pub response: Vec<u8>,
}

/// Completion callback, invoked exactly once per accepted email.
///
/// The callback receives the record back by value; dropping it releases
/// the payload and caller data.
pub type Completion = Box<dyn FnOnce(Email, Delivery)>;

/// An email awaiting delivery.
///
/// Addresses, payload, and caller data are copied into the record at
/// construction, so the caller's buffers may be dropped immediately. Only
/// retry bookkeeping mutates after creation.
pub struct Email {
    from: Address,
    to: Address,
    payload: Vec<u8>,
    extra: Vec<u8>,
    pub(crate) added_at: Instant,
    pub(crate) last_attempt_at: Option<Instant>,
    pub(crate) attempts: u32,
    completion: Option<Completion>,
}

impl Email {
    /// Creates an email record, copying all caller-supplied buffers.
    ///
    /// `payload` must be the complete RFC-formatted message, headers
    /// included, with any dot-stuffing already applied; the client appends
    /// the end-of-data marker itself. `extra` is opaque caller data handed
    /// back through the completion callback via [`Email::extra`].
    ///
    /// # Errors
    ///
    /// Returns an error if either address is malformed.
    pub fn new(
        from: &str,
        to: &str,
        payload: &[u8],
        extra: &[u8],
        completion: impl FnOnce(Email, Delivery) + 'static,
    ) -> Result<Self> {
        let from = Address::new(from).map_err(|e| Error::InvalidAddress(e.to_string()))?;
        let to = Address::new(to).map_err(|e| Error::InvalidAddress(e.to_string()))?;
        Ok(Self {
            from,
            to,
            payload: payload.to_vec(),
            extra: extra.to_vec(),
            added_at: Instant::now(),
            last_attempt_at: None,
            attempts: 0,
            completion: Some(Box::new(completion)),
        })
    }

    /// Returns the sender address.
    #[must_use]
    pub const fn from(&self) -> &Address {
        &self.from
    }

    /// Returns the recipient address.
    #[must_use]
    pub const fn to(&self) -> &Address {
        &self.to
    }

    /// Returns the message payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns the opaque caller data.
    #[must_use]
    pub fn extra(&self) -> &[u8] {
        &self.extra
    }

    /// Returns the number of delivery attempts made so far.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Invokes the completion callback with a terminal outcome.
    ///
    /// Consuming `self` makes a second invocation impossible; ownership of
    /// the record transfers to the callback.
    pub(crate) fn complete(mut self, status: DeliveryStatus, response: Vec<u8>) {
        if let Some(done) = self.completion.take() {
            done(self, Delivery { status, response });
        }
    }
}

impl std::fmt::Debug for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Email")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("payload_len", &self.payload.len())
            .field("extra_len", &self.extra.len())
            .field("attempts", &self.attempts)
            .finish_non_exhaustive()
    }
}
