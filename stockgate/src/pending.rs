//! Correlation between a queued request and the caller awaiting its outcome.

use tokio::sync::oneshot;

use crate::request::{DenyReason, RequestResult, UserRequest};

/// Links a request to the oneshot channel its caller is waiting on.
///
/// The oneshot sender enforces decide-exactly-once by construction: granting
/// or denying consumes the entry. The channel also buffers the value, so a
/// decision that lands before the caller starts waiting is never lost.
pub struct PendingRequest {
    request: UserRequest,
    outcome_tx: oneshot::Sender<RequestResult>,
}

impl PendingRequest {
    pub fn new(request: UserRequest) -> (Self, oneshot::Receiver<RequestResult>) {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        (
            Self {
                request,
                outcome_tx,
            },
            outcome_rx,
        )
    }

    pub fn request(&self) -> &UserRequest {
        &self.request
    }

    /// Admit the request.
    pub fn grant(self) {
        let user_id = self.request.user_id;
        self.deliver(RequestResult::granted(user_id));
    }

    /// Reject the request.
    pub fn deny(self, reason: DenyReason) {
        let user_id = self.request.user_id;
        self.deliver(RequestResult::denied(user_id, reason));
    }

    fn deliver(self, result: RequestResult) {
        if self.outcome_tx.send(result).is_err() {
            // Caller timed out or went away before the decision landed.
            tracing::debug!(
                user_id = self.request.user_id,
                request_id = self.request.request_id,
                "caller gone before admission decision was delivered"
            );
        }
    }
}
