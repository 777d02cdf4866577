//! Stale-result guard for background requests.
//!
//! Each dialog owns a [`RequestTracker`]. Starting a request hands out a new
//! token and supersedes the previous one; closing the dialog invalidates the
//! pending token. A finished task's result is applied only if its token is
//! still the pending one.

/// Identifies one background request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Default)]
pub struct RequestTracker {
    issued: u64,
    pending: Option<RequestToken>,
}

impl RequestTracker {
    /// Start a new request, superseding any pending one.
    pub fn begin(&mut self) -> RequestToken {
        self.issued += 1;
        let token = RequestToken(self.issued);
        self.pending = Some(token);
        token
    }

    /// Forget the pending request so its result is dropped on arrival.
    pub fn invalidate(&mut self) {
        self.pending = None;
    }

    /// Consume `token` if it is the pending request. Returns false for stale
    /// or already-accepted tokens.
    pub fn accept(&mut self, token: RequestToken) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
