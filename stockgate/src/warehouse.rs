//! Warehouse: owns the admission queue, spawns the worker and exposes
//! `register` to callers.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::WarehouseConfig;
use crate::pending::PendingRequest;
use crate::queue::{AdmissionQueue, OfferOutcome};
use crate::request::{DenyReason, RequestResult, UserRequest};
use crate::worker;

/// Front door of the admission pipeline.
///
/// Construction spawns the single worker task, so a tokio runtime must be
/// running. Stock is owned by the worker; everything else reads snapshots
/// through a watch channel.
pub struct Warehouse {
    queue: Arc<AdmissionQueue>,
    config: WarehouseConfig,
    stock_rx: watch::Receiver<u64>,
    shutdown_tx: watch::Sender<bool>,
    worker: JoinHandle<()>,
}

impl Warehouse {
    pub fn new(config: WarehouseConfig) -> Self {
        let queue = Arc::new(AdmissionQueue::new(config.queue_capacity));
        let (stock_tx, stock_rx) = watch::channel(config.initial_stock);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker = tokio::spawn(worker::run(
            Arc::clone(&queue),
            config.clone(),
            stock_tx,
            shutdown_rx,
        ));

        Self {
            queue,
            config,
            stock_rx,
            shutdown_tx,
            worker,
        }
    }

    /// Submit a request and wait for its admission decision.
    ///
    /// Always resolves to exactly one result, within roughly
    /// `enqueue_timeout + process_timeout`. Every failure mode is a value;
    /// nothing is thrown past this boundary. The call itself never touches
    /// stock - all mutation happens on the worker.
    pub async fn register(&self, request: UserRequest) -> RequestResult {
        let user_id = request.user_id;
        let (pending, outcome_rx) = PendingRequest::new(request);

        match self.queue.offer(pending, self.config.enqueue_timeout).await {
            OfferOutcome::Enqueued => {}
            OfferOutcome::TimedOut => {
                tracing::warn!(user_id, "admission queue full, rejecting");
                return RequestResult::denied(user_id, DenyReason::Busy);
            }
            OfferOutcome::Closed => {
                tracing::error!(user_id, "admission queue closed");
                return RequestResult::denied(user_id, DenyReason::QueueUnavailable);
            }
        }

        match tokio::time::timeout(self.config.process_timeout, outcome_rx).await {
            Ok(Ok(result)) => result,
            // The worker dropped the entry without deciding it.
            Ok(Err(_)) => RequestResult::denied(user_id, DenyReason::QueueUnavailable),
            Err(_) => {
                tracing::warn!(user_id, "no admission decision within the processing window");
                RequestResult::denied(user_id, DenyReason::ProcessTimeout)
            }
        }
    }

    /// Read-only stock snapshot, as of the last batch commit.
    pub fn stock(&self) -> u64 {
        *self.stock_rx.borrow()
    }

    pub fn config(&self) -> &WarehouseConfig {
        &self.config
    }

    /// Stop the worker and wait for it to exit.
    ///
    /// Entries still queued are denied as unavailable, so their callers see
    /// that denial instead of waiting out the processing window.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.worker.await {
            tracing::error!(error = %e, "admission worker task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn quiet_config() -> WarehouseConfig {
        WarehouseConfig::default().without_record_delay()
    }

    #[tokio::test(start_paused = true)]
    async fn single_request_within_stock_is_granted() {
        let warehouse = Warehouse::new(quiet_config().with_initial_stock(5));

        let result = warehouse.register(UserRequest::new(100, 1, 3)).await;

        assert!(result.success);
        assert_eq!(warehouse.stock(), 2);
        warehouse.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_requests_deplete_stock_then_reject() {
        let warehouse = Warehouse::new(quiet_config().with_initial_stock(5));

        let first = warehouse.register(UserRequest::new(100, 1, 2)).await;
        assert!(first.success);
        assert_eq!(warehouse.stock(), 3);

        let second = warehouse.register(UserRequest::new(101, 2, 2)).await;
        assert!(second.success);
        assert_eq!(warehouse.stock(), 1);

        let third = warehouse.register(UserRequest::new(102, 3, 2)).await;
        assert!(!third.success);
        assert_eq!(
            third.message.as_deref(),
            Some("requested amount exceeds available stock (current stock: 1)")
        );
        assert_eq!(warehouse.stock(), 1);

        warehouse.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_conserve_stock() {
        // Ten callers of amount 1 against 5 units: exactly five grants, no
        // lost or duplicated decisions, stock drained to zero.
        let warehouse = Arc::new(Warehouse::new(quiet_config().with_initial_stock(5)));

        let callers: Vec<_> = (0..10)
            .map(|i| {
                let warehouse = Arc::clone(&warehouse);
                tokio::spawn(
                    async move { warehouse.register(UserRequest::new(100 + i, i, 1)).await },
                )
            })
            .collect();

        let mut results = Vec::new();
        for caller in callers {
            results.push(caller.await.unwrap());
        }

        assert_eq!(results.len(), 10);
        let granted = results.iter().filter(|r| r.success).count();
        assert_eq!(granted, 5);
        for denied in results.iter().filter(|r| !r.success) {
            assert!(
                denied
                    .message
                    .as_deref()
                    .unwrap()
                    .starts_with("requested amount exceeds available stock")
            );
        }
        assert_eq!(warehouse.stock(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn saturated_queue_reports_busy() {
        // The worker is stuck in a long recording sleep, so the queue fills
        // up and a sixth concurrent caller hits the enqueue window.
        let config = WarehouseConfig {
            enqueue_timeout: Duration::from_millis(100),
            record_delay_min: Duration::from_secs(10),
            record_delay_max: Duration::from_secs(10),
            ..WarehouseConfig::default()
        };
        let warehouse = Arc::new(Warehouse::new(config));

        // Occupy the worker.
        let first = Arc::clone(&warehouse);
        tokio::spawn(async move { first.register(UserRequest::new(100, 0, 1)).await });
        tokio::time::sleep(Duration::from_millis(1)).await;

        // Fill all five queue slots.
        for i in 1..=5 {
            let warehouse = Arc::clone(&warehouse);
            tokio::spawn(
                async move { warehouse.register(UserRequest::new(100 + i, i, 1)).await },
            );
        }
        tokio::time::sleep(Duration::from_millis(1)).await;

        let sixth = warehouse.register(UserRequest::new(106, 6, 1)).await;
        assert!(!sixth.success);
        assert_eq!(
            sixth.message.as_deref(),
            Some("system busy, unable to accept this request")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_batch_resolves_as_process_timeout() {
        let config = WarehouseConfig {
            process_timeout: Duration::from_millis(500),
            record_delay_min: Duration::from_secs(10),
            record_delay_max: Duration::from_secs(10),
            ..WarehouseConfig::default()
        };
        let warehouse = Warehouse::new(config);

        let result = warehouse.register(UserRequest::new(100, 1, 1)).await;

        assert!(!result.success);
        assert_eq!(
            result.message.as_deref(),
            Some("timed out waiting for admission decision")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_the_worker() {
        let warehouse = Warehouse::new(quiet_config());
        assert_eq!(warehouse.stock(), 5);
        warehouse.shutdown().await;
    }
}
