//! Bounded admission queue: the only hand-off between callers and the worker.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{SendTimeoutError, TryRecvError};

use crate::pending::PendingRequest;

/// Producer-side result of an [`AdmissionQueue::offer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    Enqueued,
    /// The queue stayed full past the allowed wait. Non-fatal backpressure.
    TimedOut,
    /// The consumer side is gone.
    Closed,
}

/// Bounded FIFO buffer of pending requests.
///
/// Many producers, one consumer. Producers wait up to a deadline when the
/// buffer is full; the consumer either suspends until the next entry
/// arrives (`recv`) or drains opportunistically (`try_poll`). Ties among
/// simultaneous producers resolve in channel acquisition order - no total
/// order is promised, but entries are never reordered once admitted.
pub struct AdmissionQueue {
    tx: mpsc::Sender<PendingRequest>,
    rx: Mutex<mpsc::Receiver<PendingRequest>>,
    capacity: usize,
}

impl AdmissionQueue {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Mutex::new(rx),
            capacity,
        }
    }

    /// Append an entry, waiting up to `timeout` for room when full.
    pub async fn offer(&self, entry: PendingRequest, timeout: Duration) -> OfferOutcome {
        match self.tx.send_timeout(entry, timeout).await {
            Ok(()) => OfferOutcome::Enqueued,
            Err(SendTimeoutError::Timeout(_)) => OfferOutcome::TimedOut,
            Err(SendTimeoutError::Closed(_)) => OfferOutcome::Closed,
        }
    }

    /// Blocking dequeue. Returns `None` once the queue is closed and empty.
    pub async fn recv(&self) -> Option<PendingRequest> {
        self.rx.lock().await.recv().await
    }

    /// Non-blocking head removal, used by the worker's batch drain.
    pub fn try_poll(&self) -> Option<PendingRequest> {
        let mut rx = self.rx.try_lock().ok()?;
        match rx.try_recv() {
            Ok(entry) => Some(entry),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
