//! Tunables for the admission pipeline.

use std::time::Duration;

/// Configuration for [`Warehouse`](crate::Warehouse).
///
/// Defaults match the reference deployment: a 5-slot queue drained in
/// batches of up to 6, 500ms producer-side windows, 5 units of initial
/// stock and a 20-100ms simulated recording cost per batch.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// How long `register` waits for queue room before reporting busy.
    pub enqueue_timeout: Duration,
    /// How long `register` waits for the admission decision.
    pub process_timeout: Duration,
    /// Bound on the admission queue.
    pub queue_capacity: usize,
    /// Upper bound on entries drained per batch.
    pub batch_size: usize,
    /// Stock available at startup.
    pub initial_stock: u64,
    /// Lower bound of the simulated per-batch recording delay.
    ///
    /// The delay is paid once per batch, before the stock commit, even for
    /// batches where nothing was admitted.
    pub record_delay_min: Duration,
    /// Upper bound (exclusive) of the simulated per-batch recording delay.
    pub record_delay_max: Duration,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            enqueue_timeout: Duration::from_millis(500),
            process_timeout: Duration::from_millis(500),
            queue_capacity: 5,
            batch_size: 6,
            initial_stock: 5,
            record_delay_min: Duration::from_millis(20),
            record_delay_max: Duration::from_millis(100),
        }
    }
}

impl WarehouseConfig {
    /// Zero the simulated recording delay.
    pub fn without_record_delay(mut self) -> Self {
        self.record_delay_min = Duration::ZERO;
        self.record_delay_max = Duration::ZERO;
        self
    }

    pub fn with_initial_stock(mut self, stock: u64) -> Self {
        self.initial_stock = stock;
        self
    }
}
