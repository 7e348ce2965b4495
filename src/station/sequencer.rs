//! Ordering of in-flight requests.
//!
//! Submissions are dispatched concurrently and may resolve in any order.
//! Each one carries a [`Ticket`]; a response is applied only when its
//! ticket is newer than the last applied one.

/// Monotonic request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: u64,
    applied: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Accept `ticket` if it is newer than everything applied so far.
    pub fn admit(&mut self, ticket: Ticket) -> bool {
        if ticket.0 > self.applied {
            self.applied = ticket.0;
            true
        } else {
            false
        }
    }

    /// Make every ticket issued so far stale.
    pub fn invalidate(&mut self) {
        self.applied = self.issued;
    }

    pub fn latest_applied(&self) -> u64 {
        self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tickets_increase() {
        let mut seq = RequestSequencer::new();
        let a = seq.issue();
        let b = seq.issue();
        assert!(b > a);
        assert_eq!(a.value(), 1);
        assert_eq!(b.value(), 2);
    }

    #[test]
    fn test_in_order_responses_are_admitted() {
        let mut seq = RequestSequencer::new();
        let a = seq.issue();
        let b = seq.issue();
        assert!(seq.admit(a));
        assert!(seq.admit(b));
    }

    #[test]
    fn test_older_response_after_newer_is_stale() {
        let mut seq = RequestSequencer::new();
        let a = seq.issue();
        let b = seq.issue();
        assert!(seq.admit(b));
        assert!(!seq.admit(a));
        assert_eq!(seq.latest_applied(), 2);
    }

    #[test]
    fn test_same_ticket_is_admitted_once() {
        let mut seq = RequestSequencer::new();
        let a = seq.issue();
        assert!(seq.admit(a));
        assert!(!seq.admit(a));
    }

    #[test]
    fn test_invalidate_drops_in_flight_tickets() {
        let mut seq = RequestSequencer::new();
        let a = seq.issue();
        seq.invalidate();
        assert!(!seq.admit(a));
        let b = seq.issue();
        assert!(seq.admit(b));
    }
}
