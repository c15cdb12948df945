//! Concurrent load driver for the warehouse admission pipeline.
//!
//! Spawns a burst of callers against a single warehouse and logs every
//! outcome plus the final stock level. Filter with `RUST_LOG`, e.g.
//! `RUST_LOG=stockgate=debug cargo run --bin loadgen`.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use stockgate::{UserRequest, Warehouse, WarehouseConfig};

const CALLERS: u64 = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stockgate=debug,loadgen=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let config = WarehouseConfig::default();
    info!(
        initial_stock = config.initial_stock,
        queue_capacity = config.queue_capacity,
        batch_size = config.batch_size,
        callers = CALLERS,
        "starting load run"
    );

    let warehouse = Arc::new(Warehouse::new(config));

    let callers: Vec<_> = (0..CALLERS)
        .map(|i| {
            let warehouse = Arc::clone(&warehouse);
            tokio::spawn(async move { warehouse.register(UserRequest::new(100 + i, i, 1)).await })
        })
        .collect();

    for outcome in join_all(callers).await {
        let result = outcome?;
        info!(
            user_id = result.user_id,
            success = result.success,
            message = result.message.as_deref().unwrap_or(""),
            "caller finished"
        );
    }

    info!(stock = warehouse.stock(), "load run complete");

    match Arc::try_unwrap(warehouse) {
        Ok(warehouse) => warehouse.shutdown().await,
        Err(_) => warn!("warehouse still shared, skipping shutdown"),
    }
    Ok(())
}
