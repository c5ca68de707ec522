//! Retry and delivery-timeout policy.
//!
//! The supervisor owns the per-email bookkeeping rules: when an attempt
//! may start, and whether a failed attempt is retried or the email is
//! abandoned. There is deliberately no attempt-count cap — retries
//! continue until the delivery timeout exhausts the email's wall-clock
//! budget.

use std::time::{Duration, Instant};

use crate::email::Email;

/// Decision for an email whose attempt just failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// Reinsert at the front of the queue; next attempt no earlier than
    /// the retry interval after the failed one.
    Retry,
    /// The delivery timeout is spent; abandon the email.
    Abandon,
}

/// Policy holder for one client context.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Supervisor {
    retry_interval: Duration,
    delivery_timeout: Duration,
}

impl Supervisor {
    pub(crate) const fn new(retry_interval: Duration, delivery_timeout: Duration) -> Self {
        Self {
            retry_interval,
            delivery_timeout,
        }
    }

    /// Marks the start of a send attempt.
    pub(crate) fn begin_attempt(&self, email: &mut Email, now: Instant) {
        email.attempts += 1;
        email.last_attempt_at = Some(now);
    }

    /// Returns true once the email's total lifetime exceeds the delivery
    /// timeout, measured from first enqueue and spanning all retries.
    pub(crate) fn is_expired(&self, email: &Email, now: Instant) -> bool {
        now.duration_since(email.added_at) >= self.delivery_timeout
    }

    /// Earliest instant the email may be attempted again, if it has been
    /// attempted before.
    pub(crate) fn retry_at(&self, email: &Email) -> Option<Instant> {
        email.last_attempt_at.map(|at| at + self.retry_interval)
    }

    /// Returns true if the retry spacing allows an attempt now.
    pub(crate) fn may_attempt(&self, email: &Email, now: Instant) -> bool {
        self.retry_at(email).is_none_or(|at| now >= at)
    }

    /// Decides the fate of an email whose attempt failed.
    pub(crate) fn on_failure(&self, email: &Email, now: Instant) -> Verdict {
        if self.is_expired(email, now) {
            Verdict::Abandon
        } else {
            Verdict::Retry
        }
    }

    /// Deadline by which the email must be resolved.
    pub(crate) fn expiry(&self, email: &Email) -> Instant {
        email.added_at + self.delivery_timeout
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const RETRY: Duration = Duration::from_secs(30);
    const TIMEOUT: Duration = Duration::from_secs(300);

    fn email_added_at(now: Instant) -> Email {
        let mut email =
            Email::new("a@example.com", "b@example.net", b"body", b"", |_, _| {}).unwrap();
        email.added_at = now;
        email
    }

    #[test]
    fn begin_attempt_updates_bookkeeping() {
        let sup = Supervisor::new(RETRY, TIMEOUT);
        let t0 = Instant::now();
        let mut email = email_added_at(t0);

        sup.begin_attempt(&mut email, t0);
        assert_eq!(email.attempts(), 1);
        assert_eq!(email.last_attempt_at, Some(t0));

        sup.begin_attempt(&mut email, t0 + RETRY);
        assert_eq!(email.attempts(), 2);
    }

    #[test]
    fn fresh_email_may_attempt_immediately() {
        let sup = Supervisor::new(RETRY, TIMEOUT);
        let t0 = Instant::now();
        let email = email_added_at(t0);
        assert!(sup.may_attempt(&email, t0));
        assert!(sup.retry_at(&email).is_none());
    }

    #[test]
    fn retry_interval_gates_next_attempt() {
        let sup = Supervisor::new(RETRY, TIMEOUT);
        let t0 = Instant::now();
        let mut email = email_added_at(t0);
        sup.begin_attempt(&mut email, t0);

        assert!(!sup.may_attempt(&email, t0));
        assert!(!sup.may_attempt(&email, t0 + RETRY - Duration::from_secs(1)));
        assert!(sup.may_attempt(&email, t0 + RETRY));
        assert_eq!(sup.retry_at(&email), Some(t0 + RETRY));
    }

    #[test]
    fn failure_before_timeout_retries() {
        let sup = Supervisor::new(RETRY, TIMEOUT);
        let t0 = Instant::now();
        let email = email_added_at(t0);
        assert_eq!(sup.on_failure(&email, t0 + Duration::from_secs(10)), Verdict::Retry);
    }

    #[test]
    fn failure_after_timeout_abandons() {
        let sup = Supervisor::new(RETRY, TIMEOUT);
        let t0 = Instant::now();
        let email = email_added_at(t0);
        assert_eq!(sup.on_failure(&email, t0 + TIMEOUT), Verdict::Abandon);
        assert_eq!(
            sup.on_failure(&email, t0 + TIMEOUT + Duration::from_secs(1)),
            Verdict::Abandon
        );
    }

    #[test]
    fn timeout_spans_all_retries_regardless_of_attempts() {
        let sup = Supervisor::new(RETRY, TIMEOUT);
        let t0 = Instant::now();
        let mut email = email_added_at(t0);

        // A single attempt is enough; the budget is wall-clock, not count.
        sup.begin_attempt(&mut email, t0);
        assert_eq!(email.attempts(), 1);
        assert_eq!(sup.on_failure(&email, t0 + TIMEOUT), Verdict::Abandon);
    }

    #[test]
    fn expiry_is_added_at_plus_timeout() {
        let sup = Supervisor::new(RETRY, TIMEOUT);
        let t0 = Instant::now();
        let email = email_added_at(t0);
        assert_eq!(sup.expiry(&email), t0 + TIMEOUT);
    }
}
