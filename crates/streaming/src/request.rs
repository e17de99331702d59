use serde::{Deserialize, Serialize};

use crate::protocol::Endpoint;

/// Identifies an issued request in a deterministic, stable way.
///
/// Sequence numbers are shared across endpoints so a ticket can be compared
/// against requests of any kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket {
    pub seq: u64,
    pub endpoint: Endpoint,
}

/// What to do with a response that resolves after a newer one.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOrdering {
    /// Apply responses as they resolve; the last one to arrive wins.
    ArrivalOrder,
    /// Drop responses superseded by a newer request or an already applied frame.
    #[default]
    DiscardStale,
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    next_seq: u64,
    newest_path: u64,
    newest_crop: u64,
    newest_frame_applied: u64,
    ordering: ResponseOrdering,
}

impl RequestSequencer {
    pub fn new(ordering: ResponseOrdering) -> Self {
        Self {
            ordering,
            ..Self::default()
        }
    }

    pub fn ordering(&self) -> ResponseOrdering {
        self.ordering
    }

    pub fn issue(&mut self, endpoint: Endpoint) -> Ticket {
        self.next_seq += 1;
        let seq = self.next_seq;
        match endpoint {
            Endpoint::UpdateImagePath => self.newest_path = seq,
            Endpoint::UpdateImageContent => self.newest_crop = seq,
            Endpoint::GetFrame => {}
        }
        Ticket { seq, endpoint }
    }

    /// Returns `true` if the response for `ticket` should be applied.
    ///
    /// Accepting a frame ticket records it as the newest applied frame.
    pub fn accept(&mut self, ticket: Ticket) -> bool {
        let fresh = match ticket.endpoint {
            Endpoint::UpdateImagePath => ticket.seq >= self.newest_path,
            Endpoint::UpdateImageContent => {
                ticket.seq >= self.newest_crop && ticket.seq >= self.newest_path
            }
            Endpoint::GetFrame => ticket.seq >= self.newest_frame_applied,
        };
        if !fresh && self.ordering == ResponseOrdering::DiscardStale {
            return false;
        }
        if ticket.endpoint == Endpoint::GetFrame {
            self.newest_frame_applied = self.newest_frame_applied.max(ticket.seq);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_are_monotonic_across_endpoints() {
        let mut s = RequestSequencer::default();
        let a = s.issue(Endpoint::UpdateImagePath);
        let b = s.issue(Endpoint::GetFrame);
        let c = s.issue(Endpoint::UpdateImageContent);
        assert!(a.seq < b.seq && b.seq < c.seq);
    }

    #[test]
    fn stale_frame_is_discarded() {
        let mut s = RequestSequencer::new(ResponseOrdering::DiscardStale);
        let old = s.issue(Endpoint::GetFrame);
        let new = s.issue(Endpoint::GetFrame);
        assert!(s.accept(new));
        assert!(!s.accept(old));
    }

    #[test]
    fn in_order_frames_are_all_applied() {
        let mut s = RequestSequencer::default();
        let a = s.issue(Endpoint::GetFrame);
        let b = s.issue(Endpoint::GetFrame);
        assert!(s.accept(a));
        assert!(s.accept(b));
    }

    #[test]
    fn superseded_path_and_crop_are_discarded() {
        let mut s = RequestSequencer::default();
        let crop = s.issue(Endpoint::UpdateImageContent);
        let path_old = s.issue(Endpoint::UpdateImagePath);
        let path_new = s.issue(Endpoint::UpdateImagePath);
        assert!(!s.accept(crop));
        assert!(!s.accept(path_old));
        assert!(s.accept(path_new));
    }

    #[test]
    fn arrival_order_applies_everything() {
        let mut s = RequestSequencer::new(ResponseOrdering::ArrivalOrder);
        let old = s.issue(Endpoint::GetFrame);
        let new = s.issue(Endpoint::GetFrame);
        assert!(s.accept(new));
        assert!(s.accept(old));
    }
}
