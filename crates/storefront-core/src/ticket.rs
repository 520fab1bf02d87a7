//! Request tickets.
//!
//! Every network action takes a ticket before it suspends. When the response
//! arrives it is applied only if its ticket is newer than the last applied
//! ticket of the same kind, so a slow earlier request can never overwrite a
//! later one.

use std::collections::BTreeMap;

/// A monotonically increasing request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// Ticket bookkeeping for a single kind of request.
#[derive(Debug, Clone, Default)]
pub struct Tickets {
    issued: u64,
    applied: u64,
    in_flight: usize,
}

impl Tickets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket and mark a request in flight.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.in_flight += 1;
        Ticket(self.issued)
    }

    /// Finish the request behind `ticket`.
    ///
    /// Always clears its in-flight mark. Returns whether the response should
    /// be applied.
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        if ticket.0 <= self.applied {
            tracing::debug!(ticket = ticket.0, applied = self.applied, "discarding stale response");
            return false;
        }
        self.applied = ticket.0;
        true
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn last_applied(&self) -> Option<Ticket> {
        (self.applied > 0).then_some(Ticket(self.applied))
    }
}

/// Ticket bookkeeping for several kinds of request.
///
/// Sequence numbers are shared across kinds; staleness is judged per kind.
#[derive(Debug, Clone)]
pub struct TicketBook<K: Ord> {
    issued: u64,
    kinds: BTreeMap<K, Tickets>,
}

impl<K: Ord> Default for TicketBook<K> {
    fn default() -> Self {
        Self {
            issued: 0,
            kinds: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy> TicketBook<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, kind: K) -> Ticket {
        self.issued += 1;
        let tickets = self.kinds.entry(kind).or_default();
        tickets.in_flight += 1;
        tickets.issued = self.issued;
        Ticket(self.issued)
    }

    pub fn finish(&mut self, kind: K, ticket: Ticket) -> bool {
        self.kinds.entry(kind).or_default().finish(ticket)
    }

    /// Whether any request of any kind is in flight.
    pub fn is_loading(&self) -> bool {
        self.kinds.values().any(Tickets::is_loading)
    }

    pub fn is_kind_loading(&self, kind: K) -> bool {
        self.kinds.get(&kind).is_some_and(Tickets::is_loading)
    }
}
