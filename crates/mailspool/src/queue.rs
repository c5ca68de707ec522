//! Bounded FIFO queue of pending emails.
//!
//! The queue owns its records outright; starting an attempt moves the head
//! record out by value, so a record can never be reachable from two places
//! at once. Retried records re-enter at the front to keep their original
//! priority over never-attempted mail.

use std::collections::VecDeque;

use crate::email::Email;

/// Ordered collection of emails awaiting delivery.
#[derive(Debug)]
pub(crate) struct EmailQueue {
    emails: VecDeque<Email>,
    max_depth: usize,
}

impl EmailQueue {
    /// Creates a queue holding at most `max_depth` records.
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            emails: VecDeque::with_capacity(max_depth),
            max_depth,
        }
    }

    /// Appends a record, preserving arrival order.
    ///
    /// At capacity the queue is left untouched and the record is handed
    /// back to the caller.
    pub(crate) fn enqueue(&mut self, email: Email) -> Result<(), Email> {
        if self.emails.len() >= self.max_depth {
            return Err(email);
        }
        self.emails.push_back(email);
        Ok(())
    }

    /// Reinserts a record at the front, ahead of never-attempted mail.
    ///
    /// Fails like [`EmailQueue::enqueue`] when at capacity.
    pub(crate) fn requeue_front(&mut self, email: Email) -> Result<(), Email> {
        if self.emails.len() >= self.max_depth {
            return Err(email);
        }
        self.emails.push_front(email);
        Ok(())
    }

    /// Takes the oldest record, transferring ownership to the caller.
    pub(crate) fn pop_front(&mut self) -> Option<Email> {
        self.emails.pop_front()
    }

    /// Returns the oldest record without removing it.
    pub(crate) fn peek_front(&self) -> Option<&Email> {
        self.emails.front()
    }

    pub(crate) fn len(&self) -> usize {
        self.emails.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    /// Removes and yields every record, oldest first.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = Email> + '_ {
        self.emails.drain(..)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::email::Email;

    fn email(tag: &str) -> Email {
        Email::new("a@example.com", "b@example.net", b"body", tag.as_bytes(), |_, _| {}).unwrap()
    }

    fn tag(email: &Email) -> String {
        String::from_utf8_lossy(email.extra()).into_owned()
    }

    #[test]
    fn fifo_order() {
        let mut q = EmailQueue::new(4);
        q.enqueue(email("one")).unwrap();
        q.enqueue(email("two")).unwrap();
        q.enqueue(email("three")).unwrap();

        assert_eq!(tag(&q.pop_front().unwrap()), "one");
        assert_eq!(tag(&q.pop_front().unwrap()), "two");
        assert_eq!(tag(&q.pop_front().unwrap()), "three");
        assert!(q.pop_front().is_none());
    }

    #[test]
    fn rejects_at_capacity_without_mutation() {
        let mut q = EmailQueue::new(2);
        q.enqueue(email("one")).unwrap();
        q.enqueue(email("two")).unwrap();

        let rejected = q.enqueue(email("three")).unwrap_err();
        assert_eq!(tag(&rejected), "three");
        assert_eq!(q.len(), 2);
        assert_eq!(tag(q.peek_front().unwrap()), "one");
    }

    #[test]
    fn requeue_front_takes_priority() {
        let mut q = EmailQueue::new(4);
        q.enqueue(email("fresh")).unwrap();
        q.requeue_front(email("retried")).unwrap();

        assert_eq!(tag(&q.pop_front().unwrap()), "retried");
        assert_eq!(tag(&q.pop_front().unwrap()), "fresh");
    }

    #[test]
    fn requeue_front_rejects_at_capacity() {
        let mut q = EmailQueue::new(1);
        q.enqueue(email("held")).unwrap();
        assert!(q.requeue_front(email("retried")).is_err());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn peek_does_not_remove() {
        let mut q = EmailQueue::new(2);
        q.enqueue(email("only")).unwrap();
        assert_eq!(tag(q.peek_front().unwrap()), "only");
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn drain_empties_in_order() {
        let mut q = EmailQueue::new(3);
        q.enqueue(email("one")).unwrap();
        q.enqueue(email("two")).unwrap();

        let tags: Vec<String> = q.drain().map(|e| tag(&e)).collect();
        assert_eq!(tags, ["one", "two"]);
        assert!(q.is_empty());
    }

    proptest! {
        /// Depth never exceeds the bound for any enqueue/dequeue interleaving.
        #[test]
        fn depth_never_exceeds_bound(ops in prop::collection::vec(any::<bool>(), 0..64), depth in 1usize..8) {
            let mut q = EmailQueue::new(depth);
            for enqueue in ops {
                if enqueue {
                    let _ = q.enqueue(email("e"));
                } else {
                    let _ = q.pop_front();
                }
                prop_assert!(q.len() <= depth);
            }
        }
    }
}
