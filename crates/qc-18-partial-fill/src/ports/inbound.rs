//! # Inbound Ports
//!
//! The coordinator API consumed by swap orchestration.

use crate::domain::{
    BidSubmission, CreateOrderRequest, ExecutionOptions, ExecutionRecord, FillError,
    OrderAnalytics, OrderProgress, PartialFillOrder, PartialOrder, ResolverAssignment,
    ResolverBid,
};

/// Partial-fill coordination API.
pub trait PartialFillApi: Send + Sync {
    /// Decompose an order into partial orders.
    fn create_order(&self, request: CreateOrderRequest) -> Result<PartialFillOrder, FillError>;

    /// Snapshot of an order.
    fn get_order(&self, order_id: &str) -> Result<PartialFillOrder, FillError>;

    /// Re-cut a pending order into new partial amounts.
    fn modify_order(
        &self,
        order_id: &str,
        partial_amounts: Vec<f64>,
    ) -> Result<PartialFillOrder, FillError>;

    /// Cancel a non-terminal order.
    fn cancel_order(&self, order_id: &str) -> Result<PartialFillOrder, FillError>;

    /// Bind a resolver to every pending partial order. Returns new bindings only.
    fn assign_resolvers(&self, order_id: &str) -> Result<Vec<ResolverAssignment>, FillError>;

    /// Record a resolver's bid for a partial order.
    fn submit_bid(
        &self,
        partial_order_id: &str,
        bid: BidSubmission,
    ) -> Result<ResolverBid, FillError>;

    /// Accept a resolver's latest bid; reject the other open bids.
    fn accept_bid(&self, partial_order_id: &str, resolver_id: &str)
        -> Result<ResolverBid, FillError>;

    /// Claim a partial order for execution.
    fn begin_execution(
        &self,
        partial_order_id: &str,
        resolver_id: &str,
    ) -> Result<PartialOrder, FillError>;

    /// Execute a partial order. At most once per partial order.
    fn execute_partial_fill(
        &self,
        partial_order_id: &str,
        resolver_id: &str,
        options: ExecutionOptions,
    ) -> Result<ExecutionRecord, FillError>;

    /// Report that the bound resolver failed.
    fn mark_resolver_failed(
        &self,
        partial_order_id: &str,
        resolver_id: &str,
    ) -> Result<PartialOrder, FillError>;

    /// Bind a new resolver to a failed partial order.
    fn reassign_failed_resolver(
        &self,
        partial_order_id: &str,
    ) -> Result<ResolverAssignment, FillError>;

    /// Completion summary.
    fn get_progress(&self, order_id: &str) -> Result<OrderProgress, FillError>;

    /// Aggregate statistics.
    fn get_analytics(&self, order_id: &str) -> Result<OrderAnalytics, FillError>;

    /// Mark an executing order complete.
    fn mark_complete(&self, order_id: &str) -> Result<PartialFillOrder, FillError>;
}
