//! # Domain Entities
//!
//! Orders, partial orders, assignments, bids and execution records.

use super::value_objects::{
    BidStatus, OrderId, OrderStatus, PartialOrderId, PartialOrderStatus, ResolverId,
};
use qc_15_htlc::{SecretHash, SecureSecret, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Binding of a resolver to a partial order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverAssignment {
    /// Partial order id.
    pub partial_order_id: PartialOrderId,
    /// Bound resolver.
    pub resolver_id: ResolverId,
    /// When the binding was made (ms).
    pub assigned_at: Timestamp,
}

/// Proof that a partial order was executed. Present at most once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Resolver that executed.
    pub resolver_id: ResolverId,
    /// When (ms).
    pub executed_at: Timestamp,
    /// Settlement transaction reference, if supplied.
    pub tx_reference: Option<String>,
}

/// One independently fillable slice of an order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartialOrder {
    /// `{orderId}_partial_{index}`.
    pub id: PartialOrderId,
    /// Slice amount.
    pub amount: f64,
    /// Lifecycle status.
    pub status: PartialOrderStatus,
    /// Resolver currently bound (assigned or executing).
    pub resolver_id: Option<ResolverId>,
    /// Preimage, when the coordinator was handed it. Never serialized.
    #[serde(skip)]
    pub secret: Option<SecureSecret>,
    /// hash160 of the preimage locking this slice.
    pub secret_hash: Option<SecretHash>,
    /// Active assignment.
    pub assignment: Option<ResolverAssignment>,
    /// Resolvers that failed this slice; never selected again.
    pub failed_resolvers: Vec<ResolverId>,
    /// Resolver whose bid was accepted.
    pub accepted_resolver: Option<ResolverId>,
    /// Bid ledger, in submission order.
    pub bids: Vec<ResolverBid>,
    /// Execution record.
    pub execution: Option<ExecutionRecord>,
}

impl PartialOrder {
    /// Fresh pending slice.
    pub fn new(id: PartialOrderId, amount: f64) -> Self {
        Self {
            id,
            amount,
            status: PartialOrderStatus::Pending,
            resolver_id: None,
            secret: None,
            secret_hash: None,
            assignment: None,
            failed_resolvers: Vec::new(),
            accepted_resolver: None,
            bids: Vec::new(),
            execution: None,
        }
    }

    /// Bind `resolver_id` and move to Assigned.
    pub fn assign(&mut self, resolver_id: ResolverId, now: Timestamp) -> ResolverAssignment {
        let assignment = ResolverAssignment {
            partial_order_id: self.id.clone(),
            resolver_id: resolver_id.clone(),
            assigned_at: now,
        };
        self.status = PartialOrderStatus::Assigned;
        self.resolver_id = Some(resolver_id);
        self.assignment = Some(assignment.clone());
        assignment
    }
}

/// An order decomposed into partial orders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartialFillOrder {
    /// Order id.
    pub id: OrderId,
    /// Order total; equals the sum of partial amounts.
    pub total_amount: f64,
    /// Slices, in index order.
    pub partial_orders: Vec<PartialOrder>,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Creation time (ms).
    pub created_at: Timestamp,
    /// Last mutation time (ms).
    pub updated_at: Timestamp,
    /// Every assignment ever made, reassignments included.
    pub assignment_history: Vec<ResolverAssignment>,
    /// Count of failed-resolver reassignments.
    pub reassignments: u32,
}

impl PartialFillOrder {
    /// Find a slice by id.
    pub fn partial(&self, partial_order_id: &str) -> Option<&PartialOrder> {
        self.partial_orders.iter().find(|p| p.id == partial_order_id)
    }

    /// Find a slice by id, mutably.
    pub fn partial_mut(&mut self, partial_order_id: &str) -> Option<&mut PartialOrder> {
        self.partial_orders
            .iter_mut()
            .find(|p| p.id == partial_order_id)
    }

    /// Completion summary.
    pub fn progress(&self) -> OrderProgress {
        let total_parts = self.partial_orders.len();
        let completed_parts = self
            .partial_orders
            .iter()
            .filter(|p| p.status == PartialOrderStatus::Completed)
            .count();
        let completion_percentage = if total_parts == 0 {
            0.0
        } else {
            completed_parts as f64 * 100.0 / total_parts as f64
        };
        OrderProgress {
            total_parts,
            completed_parts,
            completion_percentage,
        }
    }

    /// Distinct resolvers that were ever bound or executed.
    pub fn resolvers_seen(&self) -> HashSet<&str> {
        let mut seen: HashSet<&str> = self
            .assignment_history
            .iter()
            .map(|a| a.resolver_id.as_str())
            .collect();
        for partial in &self.partial_orders {
            if let Some(exec) = &partial.execution {
                seen.insert(exec.resolver_id.as_str());
            }
        }
        seen
    }
}

/// Incoming bid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BidSubmission {
    /// Bidding resolver.
    pub resolver_id: ResolverId,
    /// Offered amount.
    pub bid_amount: f64,
    /// Requested fee.
    pub fee: f64,
}

/// Recorded bid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolverBid {
    /// Target partial order.
    pub partial_order_id: PartialOrderId,
    /// Bidding resolver.
    pub resolver_id: ResolverId,
    /// Offered amount.
    pub bid_amount: f64,
    /// Requested fee.
    pub fee: f64,
    /// Decision state.
    pub status: BidStatus,
    /// Submission time (ms).
    pub submitted_at: Timestamp,
}

/// Options for `execute_partial_fill`.
#[derive(Clone, Debug, Default)]
pub struct ExecutionOptions {
    /// Preimage; required when the slice carries a secret hash.
    pub secret: Option<SecureSecret>,
    /// Settlement transaction reference.
    pub tx_reference: Option<String>,
}

/// Request for `create_order`.
#[derive(Clone, Debug, Default)]
pub struct CreateOrderRequest {
    /// Caller-chosen id; a UUID v4 is generated when absent.
    pub order_id: Option<OrderId>,
    /// Order total.
    pub total_amount: f64,
    /// Slice amounts.
    pub partial_amounts: Vec<f64>,
    /// One hash per slice.
    pub secret_hashes: Option<Vec<SecretHash>>,
    /// One preimage per slice.
    pub secrets: Option<Vec<SecureSecret>>,
}

impl CreateOrderRequest {
    /// Request with just amounts.
    pub fn new(total_amount: f64, partial_amounts: Vec<f64>) -> Self {
        Self {
            total_amount,
            partial_amounts,
            ..Default::default()
        }
    }
}

/// Completion summary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderProgress {
    /// Number of slices.
    pub total_parts: usize,
    /// Slices executed.
    pub completed_parts: usize,
    /// `completed_parts / total_parts * 100`.
    pub completion_percentage: f64,
}

/// Aggregate statistics for an order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderAnalytics {
    /// Number of slices.
    pub total_parts: usize,
    /// Slices pending.
    pub pending_parts: usize,
    /// Slices assigned.
    pub assigned_parts: usize,
    /// Slices executing.
    pub executing_parts: usize,
    /// Slices completed.
    pub completed_parts: usize,
    /// Slices failed.
    pub failed_parts: usize,
    /// Order total.
    pub total_amount: f64,
    /// Sum of completed slice amounts.
    pub filled_amount: f64,
    /// `filled_amount / total_amount`.
    pub fill_ratio: f64,
    /// Distinct resolvers involved.
    pub unique_resolvers: usize,
    /// Bids across all slices.
    pub total_bids: usize,
    /// Mean bid fee, 0 without bids.
    pub average_bid_fee: f64,
    /// Failed-resolver reassignments.
    pub reassignments: u32,
}
