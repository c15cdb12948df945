//! Request and result value objects.

use serde::{Deserialize, Serialize};

/// An immutable allocation request submitted by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRequest {
    pub user_id: u64,
    pub request_id: u64,
    /// Units of stock asked for. Zero is allowed and always admits.
    pub amount: u64,
}

impl UserRequest {
    pub fn new(user_id: u64, request_id: u64, amount: u64) -> Self {
        Self {
            user_id,
            request_id,
            amount,
        }
    }
}

/// Why a request was denied.
///
/// The `Display` string is exactly what the caller sees in
/// [`RequestResult::message`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DenyReason {
    /// The admission queue stayed full past the enqueue window.
    #[error("system busy, unable to accept this request")]
    Busy,

    /// The queue is closed, or the worker dropped the entry undecided.
    #[error("internal error, admission queue unavailable")]
    QueueUnavailable,

    /// No decision arrived within the processing window.
    #[error("timed out waiting for admission decision")]
    ProcessTimeout,

    /// The batch partition rejected the request. `available` is the stock
    /// value the batch was decided against, before its commit.
    #[error("requested amount exceeds available stock (current stock: {available})")]
    InsufficientStock { available: u64 },
}

/// Outcome returned to the caller. Exactly one is produced per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestResult {
    pub user_id: u64,
    pub success: bool,
    pub message: Option<String>,
}

impl RequestResult {
    pub fn granted(user_id: u64) -> Self {
        Self {
            user_id,
            success: true,
            message: None,
        }
    }

    pub fn denied(user_id: u64, reason: DenyReason) -> Self {
        Self {
            user_id,
            success: false,
            message: Some(reason.to_string()),
        }
    }
}
