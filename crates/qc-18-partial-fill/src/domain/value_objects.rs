//! # Domain Value Objects
//!
//! Status machines and policies for orders and partial orders.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order identifier.
pub type OrderId = String;
/// Partial order identifier (`{orderId}_partial_{index}`).
pub type PartialOrderId = String;
/// Opaque resolver identifier.
pub type ResolverId = String;

/// Order state machine.
///
/// ```text
/// Pending ──→ Executing ──→ Completed
///    │            │
///    └────────────┴──→ Cancelled
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Created, nothing executed yet.
    #[default]
    Pending,
    /// At least one partial claimed or executed.
    Executing,
    /// Marked complete by the caller.
    Completed,
    /// Cancelled; executed partials are not rolled back.
    Cancelled,
}

impl OrderStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Executing)
                | (Self::Executing, Self::Completed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Executing, Self::Cancelled)
        )
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Executing => "executing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Partial-order state machine.
///
/// ```text
/// Pending → Assigned → Executing → Completed
///              │           │
///              └──→ Failed ←┘
///                    │
///                    └──(reassign)──→ Assigned
/// ```
///
/// Under first-come-first-served execution a pending or assigned partial
/// may also be executed directly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartialOrderStatus {
    /// No resolver bound.
    #[default]
    Pending,
    /// Resolver bound.
    Assigned,
    /// Resolver has claimed execution.
    Executing,
    /// Executed.
    Completed,
    /// Resolver failed; awaiting reassignment.
    Failed,
}

impl PartialOrderStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: PartialOrderStatus) -> bool {
        use PartialOrderStatus::*;
        matches!(
            (self, next),
            (Pending, Assigned)
                | (Pending, Executing)
                | (Pending, Completed)
                | (Assigned, Executing)
                | (Assigned, Completed)
                | (Assigned, Failed)
                | (Executing, Completed)
                | (Executing, Failed)
                | (Failed, Assigned)
        )
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for PartialOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::Executing => "executing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Bid lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BidStatus {
    /// Awaiting a decision.
    #[default]
    Submitted,
    /// Chosen for the partial order.
    Accepted,
    /// Superseded by another accepted bid.
    Rejected,
}

/// Who may execute a partial order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionPolicy {
    /// Any resolver; the first to commit wins.
    #[default]
    FirstComeFirstServed,
    /// Only the resolver whose bid was accepted.
    AcceptedBidderOnly,
}
