//! Read sequencing
//!
//! Every read is tagged with a ticket that increases per resource kind. A
//! response is applied only if its ticket is newer than the last one applied
//! for that kind, so a slow earlier fetch can never overwrite a newer one.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadKind {
    Orders,
    VoidItems,
    Tables,
}

impl ReadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::VoidItems => "void_items",
            Self::Tables => "tables",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTicket {
    pub kind: ReadKind,
    pub seq: u64,
}

#[derive(Debug, Default)]
pub struct ReadSequencer {
    issued: HashMap<ReadKind, u64>,
    applied: HashMap<ReadKind, u64>,
}

impl ReadSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket for `kind`
    pub fn issue(&mut self, kind: ReadKind) -> ReadTicket {
        let seq = self.issued.entry(kind).or_insert(0);
        *seq += 1;
        ReadTicket { kind, seq: *seq }
    }

    /// Whether a response carrying `ticket` may still be applied
    pub fn is_current(&self, ticket: ReadTicket) -> bool {
        ticket.seq > self.applied.get(&ticket.kind).copied().unwrap_or(0)
    }

    /// Record `ticket` as applied; `false` means the response is stale
    pub fn accept(&mut self, ticket: ReadTicket) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                kind = ticket.kind.as_str(),
                seq = ticket.seq,
                "discarding stale response"
            );
            return false;
        }
        self.applied.insert(ticket.kind, ticket.seq);
        true
    }

    pub fn last_applied(&self, kind: ReadKind) -> u64 {
        self.applied.get(&kind).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tickets_increase_per_kind() {
        let mut seq = ReadSequencer::new();
        assert_eq!(seq.issue(ReadKind::Orders).seq, 1);
        assert_eq!(seq.issue(ReadKind::Orders).seq, 2);
        assert_eq!(seq.issue(ReadKind::Tables).seq, 1);
    }

    #[test]
    fn test_stale_response_discarded() {
        let mut seq = ReadSequencer::new();
        let slow = seq.issue(ReadKind::Orders);
        let fast = seq.issue(ReadKind::Orders);

        assert!(seq.accept(fast));
        assert!(!seq.accept(slow));
        assert_eq!(seq.last_applied(ReadKind::Orders), 2);
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut seq = ReadSequencer::new();
        let orders = seq.issue(ReadKind::Orders);
        let _newer_orders = seq.issue(ReadKind::Orders);
        let tables = seq.issue(ReadKind::Tables);

        assert!(seq.accept(tables));
        assert!(seq.accept(orders));
        assert!(!seq.accept(orders));
        assert_eq!(seq.last_applied(ReadKind::VoidItems), 0);
    }
}
