//! Client context: composes the queue, the supervisor, and at most one
//! active protocol session over the host-supplied transport.
//!
//! The client is single-threaded and event-driven. Every entry point takes
//! the current instant from the host and returns without blocking; between
//! calls the client is inert. The host drives progress from its event loop
//! by calling [`Client::on_readable`] / [`Client::on_writable`] when the
//! transport signals readiness and [`Client::on_timer`] when the instant
//! reported by [`Client::next_deadline`] arrives.
//!
//! Completion callbacks run inline from these entry points; they must not
//! call back into the client.

use std::time::{Duration, Instant};

use bytes::BytesMut;
use tracing::{debug, trace, warn};

use mailspool_smtp::session::{Action, END_OF_DATA, Session};
use mailspool_smtp::types::Reply;
use mailspool_smtp::ReplyReader;

use crate::email::{DeliveryStatus, Email};
use crate::error::{Error, Result};
use crate::queue::EmailQueue;
use crate::supervisor::{Supervisor, Verdict};
use crate::transport::{IoOutcome, Transport};

/// Client configuration, immutable after construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Local host name announced in the HELO/EHLO greeting.
    pub helo: String,
    /// Greet with EHLO instead of HELO.
    pub use_ehlo: bool,
    /// Minimum spacing between successive attempts for the same email.
    pub retry_interval: Duration,
    /// Maximum wall-clock lifetime of an email, spanning all retries.
    pub delivery_timeout: Duration,
    /// Maximum number of queued emails.
    pub max_queue: usize,
    /// Maximum payload size in bytes.
    pub max_content_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            helo: "localhost".to_string(),
            use_ehlo: false,
            retry_interval: Duration::from_secs(15 * 60),
            delivery_timeout: Duration::from_secs(12 * 60 * 60),
            max_queue: 8,
            max_content_size: 64 * 1024,
        }
    }
}

impl ClientConfig {
    fn validate(&self) -> Result<()> {
        if self.helo.is_empty() {
            return Err(Error::InvalidConfig("helo hostname must not be empty"));
        }
        if self.max_queue == 0 {
            return Err(Error::InvalidConfig("queue depth must be non-zero"));
        }
        if self.max_content_size == 0 {
            return Err(Error::InvalidConfig("max content size must be non-zero"));
        }
        if self.retry_interval.is_zero() {
            return Err(Error::InvalidConfig("retry interval must be non-zero"));
        }
        if self.delivery_timeout.is_zero() {
            return Err(Error::InvalidConfig("delivery timeout must be non-zero"));
        }
        Ok(())
    }
}

/// How the active attempt ended.
#[derive(Debug)]
enum AttemptEnd {
    Success(Reply),
    Failure,
}

/// One in-flight delivery: the record, its protocol session, and the
/// connection-scoped buffers.
#[derive(Debug)]
struct Attempt {
    email: Email,
    session: Session,
    reader: ReplyReader,
    outbound: BytesMut,
    /// Latest reply line received, reported with failed deliveries.
    last_line: Vec<u8>,
    end: Option<AttemptEnd>,
}

/// Embeddable SMTP submission client.
///
/// One instance is independent of any other; there is no shared state
/// across contexts. Delivery is strictly serialized: a second email cannot
/// begin sending until the current one reaches a terminal state.
#[derive(Debug)]
pub struct Client<T: Transport> {
    config: ClientConfig,
    transport: T,
    queue: EmailQueue,
    supervisor: Supervisor,
    active: Option<Attempt>,
    closed: bool,
}

impl<T: Transport> Client<T> {
    /// Creates a client over an already-constructed transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid. Connection
    /// establishment happens per delivery attempt and surfaces through the
    /// retry path, not here.
    pub fn new(config: ClientConfig, transport: T) -> Result<Self> {
        config.validate()?;
        let queue = EmailQueue::new(config.max_queue);
        let supervisor = Supervisor::new(config.retry_interval, config.delivery_timeout);
        Ok(Self {
            config,
            transport,
            queue,
            supervisor,
            active: None,
            closed: false,
        })
    }

    /// Queues an email for delivery. Does not start a send; call
    /// [`Client::kick`] when work may be ready.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueFull`] or [`Error::MessageTooLarge`], both
    /// carrying the record back untouched.
    pub fn add_email(&mut self, mut email: Email, now: Instant) -> Result<()> {
        let size = email.payload().len();
        if size > self.config.max_content_size {
            return Err(Error::MessageTooLarge {
                email,
                size,
                limit: self.config.max_content_size,
            });
        }

        email.added_at = now;
        self.queue.enqueue(email).map_err(Error::QueueFull)?;
        debug!(depth = self.queue.len(), "email queued");
        Ok(())
    }

    /// Starts the next delivery if the client is idle and the head of the
    /// queue is eligible. Idempotent; a no-op while a send is in flight.
    pub fn kick(&mut self, now: Instant) {
        if self.closed || self.active.is_some() {
            return;
        }

        // Mail whose wall-clock budget ran out while idle is abandoned
        // without a futile connection.
        while let Some(head) = self.queue.peek_front() {
            if self.supervisor.is_expired(head, now) {
                if let Some(email) = self.queue.pop_front() {
                    warn!(attempts = email.attempts(), "delivery timeout, abandoning email");
                    email.complete(DeliveryStatus::TimedOut, Vec::new());
                }
                continue;
            }
            if !self.supervisor.may_attempt(head, now) {
                trace!("head of queue still inside its retry interval");
                return;
            }
            break;
        }

        let Some(mut email) = self.queue.pop_front() else {
            return;
        };
        self.supervisor.begin_attempt(&mut email, now);
        debug!(
            from = %email.from(),
            to = %email.to(),
            attempt = email.attempts(),
            "starting delivery attempt"
        );

        if let Err(e) = self.transport.open() {
            warn!(error = %e, "transport open failed");
            self.settle_failure(email, now, Vec::new());
            return;
        }

        let session = Session::new(
            self.config.helo.clone(),
            email.from().clone(),
            email.to().clone(),
            self.config.use_ehlo,
        );
        self.active = Some(Attempt {
            email,
            session,
            reader: ReplyReader::new(),
            outbound: BytesMut::new(),
            last_line: Vec::new(),
            end: None,
        });
    }

    /// Handles transport read-readiness: pulls available bytes until the
    /// transport would block and advances the protocol session.
    pub fn on_readable(&mut self, now: Instant) {
        if self.closed || self.active.is_none() {
            return;
        }

        let mut buf = [0u8; 512];
        loop {
            match self.transport.read(&mut buf) {
                Ok(IoOutcome::Ready(n)) if n > 0 => self.consume(&buf[..n]),
                Ok(IoOutcome::Ready(_) | IoOutcome::Closed) => {
                    warn!("connection closed by peer");
                    self.mark_failed();
                    break;
                }
                Ok(IoOutcome::WouldBlock) => break,
                Err(e) => {
                    warn!(error = %e, "transport read failed");
                    self.mark_failed();
                    break;
                }
            }
            if self.active.as_ref().is_none_or(|a| a.end.is_some()) {
                break;
            }
        }

        self.settle(now);
    }

    /// Handles transport write-readiness: drains pending outbound bytes.
    pub fn on_writable(&mut self, now: Instant) {
        if self.closed || self.active.is_none() {
            return;
        }
        self.settle(now);
    }

    /// Fires deadline work: aborts an attempt whose delivery timeout
    /// elapsed, or starts a retry whose interval has passed.
    pub fn on_timer(&mut self, now: Instant) {
        if self.closed {
            return;
        }

        if self.active.is_some() {
            let expired = self
                .active
                .as_ref()
                .is_some_and(|a| self.supervisor.is_expired(&a.email, now));
            if expired {
                warn!("delivery timeout elapsed mid-attempt");
                self.mark_failed();
                self.settle(now);
            }
            return;
        }

        self.kick(now);
    }

    /// Earliest instant at which [`Client::on_timer`] has work to do, for
    /// the host to arm its timer. `None` means no pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.closed {
            return None;
        }
        if let Some(attempt) = self.active.as_ref() {
            return Some(self.supervisor.expiry(&attempt.email));
        }
        self.queue.peek_front().map(|head| {
            let expiry = self.supervisor.expiry(head);
            self.supervisor
                .retry_at(head)
                .map_or(expiry, |retry| retry.min(expiry))
        })
    }

    /// Returns true if no delivery is in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Number of emails waiting in the queue, the in-flight one excluded.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Aborts any in-flight delivery, completes every held email exactly
    /// once with [`DeliveryStatus::Cancelled`], and releases the transport.
    pub fn close(mut self) {
        self.shutdown();
    }

    /// Feeds received bytes through the parser and session, buffering
    /// whatever must be sent next. Only marks the attempt's end; the
    /// caller settles it.
    fn consume(&mut self, bytes: &[u8]) {
        let Some(attempt) = self.active.as_mut() else {
            return;
        };

        if let Err(e) = attempt.reader.feed(bytes) {
            warn!(error = %e, "reply parsing failed");
            attempt.end = Some(AttemptEnd::Failure);
            return;
        }

        while let Some(reply) = attempt.reader.next_reply() {
            attempt.last_line = reply.last_line().into_bytes();
            match attempt.session.on_reply(&reply) {
                Ok(Action::Send(cmd)) => attempt.outbound.extend_from_slice(&cmd),
                Ok(Action::SendBody) => {
                    attempt.outbound.extend_from_slice(attempt.email.payload());
                    attempt.outbound.extend_from_slice(END_OF_DATA);
                }
                Ok(Action::Finish { quit, reply }) => {
                    attempt.outbound.extend_from_slice(&quit);
                    attempt.end = Some(AttemptEnd::Success(reply));
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "smtp session failed");
                    attempt.end = Some(AttemptEnd::Failure);
                    return;
                }
            }
        }
    }

    /// Writes buffered outbound bytes until done or the transport would
    /// block. A write failure marks the attempt failed unless it already
    /// succeeded (a lost QUIT does not undo a delivery).
    fn flush_outbound(&mut self) {
        let Some(attempt) = self.active.as_mut() else {
            return;
        };

        while !attempt.outbound.is_empty() {
            match self.transport.write(&attempt.outbound) {
                Ok(IoOutcome::Ready(n)) if n > 0 => {
                    let _ = attempt.outbound.split_to(n);
                }
                Ok(IoOutcome::Ready(_) | IoOutcome::WouldBlock) => break,
                Ok(IoOutcome::Closed) => {
                    if attempt.end.is_none() {
                        warn!("connection closed while writing");
                        attempt.end = Some(AttemptEnd::Failure);
                    }
                    break;
                }
                Err(e) => {
                    if attempt.end.is_none() {
                        warn!(error = %e, "transport write failed");
                        attempt.end = Some(AttemptEnd::Failure);
                    }
                    break;
                }
            }
        }
    }

    fn mark_failed(&mut self) {
        if let Some(attempt) = self.active.as_mut() {
            if attempt.end.is_none() {
                attempt.end = Some(AttemptEnd::Failure);
            }
        }
    }

    /// Flushes pending bytes, then resolves the attempt if it ended:
    /// connection released, completion or requeue performed, next delivery
    /// kicked.
    fn settle(&mut self, now: Instant) {
        self.flush_outbound();

        if self.active.as_ref().is_none_or(|a| a.end.is_none()) {
            return;
        }
        let Some(attempt) = self.active.take() else {
            return;
        };
        self.transport.close();

        match attempt.end {
            Some(AttemptEnd::Success(reply)) => {
                debug!(attempts = attempt.email.attempts(), "email delivered");
                attempt
                    .email
                    .complete(DeliveryStatus::Delivered, reply.last_line().into_bytes());
                self.kick(now);
            }
            Some(AttemptEnd::Failure) | None => {
                self.settle_failure(attempt.email, now, attempt.last_line);
            }
        }
    }

    /// Applies the supervisor's verdict to a failed attempt.
    fn settle_failure(&mut self, email: Email, now: Instant, response: Vec<u8>) {
        match self.supervisor.on_failure(&email, now) {
            Verdict::Abandon => {
                warn!(attempts = email.attempts(), "delivery timeout, abandoning email");
                email.complete(DeliveryStatus::TimedOut, response);
            }
            Verdict::Retry => {
                debug!(attempts = email.attempts(), "attempt failed, requeueing for retry");
                if let Err(email) = self.queue.requeue_front(email) {
                    // Nowhere to hold the record; treated like exhaustion.
                    warn!("queue full on reinsertion, abandoning email");
                    email.complete(DeliveryStatus::TimedOut, response);
                }
            }
        }
        self.kick(now);
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Some(attempt) = self.active.take() {
            debug!("cancelling in-flight email");
            self.transport.close();
            attempt
                .email
                .complete(DeliveryStatus::Cancelled, attempt.last_line);
        }

        if !self.queue.is_empty() {
            debug!(count = self.queue.len(), "cancelling queued emails");
        }
        let queued: Vec<Email> = self.queue.drain().collect();
        for email in queued {
            email.complete(DeliveryStatus::Cancelled, Vec::new());
        }
    }
}

impl<T: Transport> Drop for Client<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
