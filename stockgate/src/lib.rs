//! stockgate: batching admission controller for shared inventory stock.
//!
//! Concurrent callers ask for units of a shared stock. A single worker task
//! drains them in arrival order, decides each batch as one atomic stock
//! mutation, and answers every caller with a success/failure outcome.
//!
//! Architecture:
//! - [`Warehouse::register`] is the only caller-facing operation: enqueue
//!   with backpressure, then await the decision under a deadline.
//! - [`AdmissionQueue`] is the sole hand-off between callers and the worker.
//! - The worker owns the stock counter outright; everything else reads
//!   snapshots through a watch channel.

mod config;
mod pending;
mod queue;
mod request;
mod warehouse;
mod worker;

pub use config::WarehouseConfig;
pub use pending::PendingRequest;
pub use queue::{AdmissionQueue, OfferOutcome};
pub use request::{DenyReason, RequestResult, UserRequest};
pub use warehouse::Warehouse;
