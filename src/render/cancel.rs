//! Latest-request-wins cancellation

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::request::RequestId;

/// Shared record of the newest request id.
///
/// The service marks every new request; the worker checks it before starting
/// expensive work and skips anything that has been superseded.
#[derive(Clone, Debug, Default)]
pub struct LatestRequest {
    latest: Arc<AtomicU64>,
}

impl LatestRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, id: RequestId) {
        self.latest.fetch_max(id.0, Ordering::SeqCst);
    }

    pub fn get(&self) -> RequestId {
        RequestId::new(self.latest.load(Ordering::SeqCst))
    }

    pub fn is_stale(&self, id: RequestId) -> bool {
        id.0 < self.latest.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_marks_make_older_ids_stale() {
        let token = LatestRequest::new();
        token.mark(RequestId::new(1));
        assert!(!token.is_stale(RequestId::new(1)));

        let shared = token.clone();
        shared.mark(RequestId::new(3));
        assert!(token.is_stale(RequestId::new(1)));
        assert!(token.is_stale(RequestId::new(2)));
        assert!(!token.is_stale(RequestId::new(3)));
    }

    #[test]
    fn marks_never_move_backwards() {
        let token = LatestRequest::new();
        token.mark(RequestId::new(5));
        token.mark(RequestId::new(2));
        assert_eq!(token.get(), RequestId::new(5));
    }
}
