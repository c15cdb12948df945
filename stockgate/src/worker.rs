//! The single admission worker: batch formation, first-fit partition and
//! the stock commit.
//!
//! Stock lives on this task and is mutated nowhere else. That single-writer
//! ownership is what keeps the accounting race-free without a lock around
//! the counter itself; the rest of the process sees read-only snapshots
//! through a watch channel.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;

use crate::config::WarehouseConfig;
use crate::pending::PendingRequest;
use crate::queue::AdmissionQueue;
use crate::request::DenyReason;

/// One drained batch, split against pre-batch stock.
pub(crate) struct BatchPartition {
    pub admitted: Vec<PendingRequest>,
    pub rejected: Vec<PendingRequest>,
    pub admitted_total: u64,
}

/// Greedy, order-preserving first-fit admission.
///
/// Entries are tested in drain order against `stock` minus the running
/// admitted total. An entry fits iff its amount is within the remainder.
/// Rejected entries consume nothing, and later entries are still tested
/// against the untouched remainder - strictly sequential, never reordered,
/// never bin-packed.
pub(crate) fn partition_batch(stock: u64, batch: Vec<PendingRequest>) -> BatchPartition {
    let mut admitted = Vec::with_capacity(batch.len());
    let mut rejected = Vec::new();
    let mut admitted_total: u64 = 0;

    for entry in batch {
        let remaining = stock - admitted_total;
        if entry.request().amount <= remaining {
            admitted_total += entry.request().amount;
            admitted.push(entry);
        } else {
            rejected.push(entry);
        }
    }

    BatchPartition {
        admitted,
        rejected,
        admitted_total,
    }
}

fn record_delay(config: &WarehouseConfig) -> Duration {
    if config.record_delay_max <= config.record_delay_min {
        return config.record_delay_min;
    }
    let min = config.record_delay_min.as_millis() as u64;
    let max = config.record_delay_max.as_millis() as u64;
    Duration::from_millis(rand::thread_rng().gen_range(min..max))
}

/// Run the admission loop until shutdown or queue closure.
///
/// Each iteration suspends until work arrives, drains up to
/// `config.batch_size` entries, partitions them, answers the rejected
/// callers immediately, pays the simulated recording cost once, commits the
/// stock mutation and only then answers the admitted callers.
pub(crate) async fn run(
    queue: Arc<AdmissionQueue>,
    config: WarehouseConfig,
    stock_tx: watch::Sender<u64>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut stock = config.initial_stock;
    tracing::info!(
        stock,
        capacity = queue.capacity(),
        batch_size = config.batch_size,
        "admission worker started"
    );

    loop {
        let first = tokio::select! {
            biased;

            _ = shutdown_rx.changed() => break,

            entry = queue.recv() => match entry {
                Some(entry) => entry,
                None => break,
            },
        };

        let mut batch = vec![first];
        while batch.len() < config.batch_size {
            match queue.try_poll() {
                Some(entry) => batch.push(entry),
                None => break,
            }
        }

        let drained = batch.len();
        let partition = partition_batch(stock, batch);
        tracing::debug!(
            drained,
            admitted = partition.admitted.len(),
            rejected = partition.rejected.len(),
            admitted_total = partition.admitted_total,
            stock,
            "batch partitioned"
        );

        for entry in partition.rejected {
            entry.deny(DenyReason::InsufficientStock { available: stock });
        }

        // Recording cost is paid once per batch, before the commit, even
        // when nothing was admitted.
        tokio::time::sleep(record_delay(&config)).await;

        stock -= partition.admitted_total;
        stock_tx.send_replace(stock);

        for entry in partition.admitted {
            entry.grant();
        }
    }

    // Whatever is still queued will never be decided; tell the callers.
    while let Some(entry) = queue.try_poll() {
        entry.deny(DenyReason::QueueUnavailable);
    }
    tracing::info!(stock, "admission worker stopped");
}
