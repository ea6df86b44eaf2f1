//! # Outbound Ports
//!
//! Order persistence and resolver selection. The clock port is shared
//! with the HTLC subsystem (`qc_15_htlc::TimeSource`).

use crate::domain::{FillError, PartialFillOrder, PartialOrder, ResolverId};

/// Order mutation applied by [`OrderStore::update`].
pub type OrderMutation<'a> = dyn FnMut(&mut PartialFillOrder) -> Result<(), FillError> + 'a;

/// Order persistence.
///
/// `update` is the only way to mutate an order, its partial orders or their
/// bid ledgers. Implementations must run the mutation against a copy while
/// holding the order lock, and commit the copy only when it returns `Ok`.
pub trait OrderStore: Send + Sync {
    /// Insert a new order. Fails `DuplicateOrder` if the id exists.
    fn insert(&self, order: PartialFillOrder) -> Result<(), FillError>;

    /// Snapshot of an order.
    fn get(&self, order_id: &str) -> Option<PartialFillOrder>;

    /// Atomically apply `mutation`. Returns the committed order.
    fn update(
        &self,
        order_id: &str,
        mutation: &mut OrderMutation<'_>,
    ) -> Result<PartialFillOrder, FillError>;

    /// Number of orders.
    fn len(&self) -> usize;

    /// Whether the store holds no orders.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Chooses a resolver for a partial order.
pub trait ResolverSelector: Send + Sync {
    /// Pick a resolver not listed in `partial.failed_resolvers`.
    fn select(&self, partial: &PartialOrder) -> Result<ResolverId, FillError>;
}
