//! # Domain Errors
//!
//! Error types for partial-fill coordination.

use qc_15_htlc::HtlcError;
use thiserror::Error;

/// Coordinator error types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FillError {
    /// Partial amounts do not sum to the order total.
    #[error("Amount mismatch: expected {expected}, partials sum to {actual}")]
    AmountMismatch {
        /// Order total
        expected: f64,
        /// Sum of partial amounts
        actual: f64,
    },

    /// Amount is non-finite, non-positive, or the partial list is empty.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Malformed request.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unknown order or partial order.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Order id already exists.
    #[error("Duplicate order: {0}")]
    DuplicateOrder(String),

    /// Partial order has already been executed.
    #[error("Partial order already executed: {0}")]
    AlreadyExecuted(String),

    /// Order is completed or cancelled.
    #[error("Order {order_id} is terminal ({status})")]
    OrderTerminal {
        /// Order id
        order_id: String,
        /// Terminal status
        status: String,
    },

    /// State machine forbids the requested move.
    #[error("Invalid transition for {id}: {from} -> {to}")]
    InvalidTransition {
        /// Order or partial order id
        id: String,
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// Resolver does not hold the assignment, claim or accepted bid.
    #[error("Resolver {resolver_id} not authorized for {partial_order_id}")]
    ResolverNotAuthorized {
        /// Partial order id
        partial_order_id: String,
        /// Offending resolver
        resolver_id: String,
    },

    /// Every candidate resolver is excluded.
    #[error("No resolver available for {0}")]
    NoResolverAvailable(String),

    /// Supplied secret does not hash to the partial's secret hash.
    #[error("Secret does not match hash of {0}")]
    SecretMismatch(String),

    /// Error from the HTLC subsystem.
    #[error("HTLC error: {0}")]
    Htlc(#[from] HtlcError),
}

impl FillError {
    /// Whether the same call may legitimately succeed later.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NoResolverAvailable(_) => true,
            Self::Htlc(inner) => inner.is_retryable(),
            _ => false,
        }
    }
}
