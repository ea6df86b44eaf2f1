//! # QC-18 Partial-Fill Coordination
//!
//! Decomposes a swap order into independently fillable partial orders,
//! each locked to its own secret, and coordinates the resolvers that
//! fill them.
//!
//! **Subsystem ID:** 18
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Guarantees
//!
//! | Guarantee | Mechanism |
//! |-----------|-----------|
//! | Partials sum to the total (1e-6) | Checked on create and modify |
//! | A partial executes at most once | Check-and-set inside `OrderStore::update` |
//! | Failed calls change nothing | Mutations run on a copy, committed on `Ok` |
//! | Failed resolvers are not reselected | `ResolverSelector` excludes them |
//! | Secrets never serialized | `#[serde(skip)]` plus `SecureSecret` redaction |
//!
//! ## Module Structure
//!
//! ```text
//! qc-18-partial-fill/
//! ├── domain/          # Orders, partials, bids, status machines, errors
//! ├── ports/           # PartialFillApi, OrderStore, ResolverSelector
//! ├── adapters/        # InMemoryOrderStore, ResolverPool
//! └── service/         # PartialFillCoordinator
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{InMemoryOrderStore, ResolverPool};
pub use domain::{
    BidStatus, BidSubmission, CoordinatorConfig, CreateOrderRequest, ExecutionOptions,
    ExecutionPolicy, ExecutionRecord, FillError, OrderAnalytics, OrderProgress, OrderStatus,
    PartialFillOrder, PartialOrder, PartialOrderStatus, ResolverAssignment, ResolverBid,
    AMOUNT_TOLERANCE,
};
pub use metrics::{CoordinatorMetrics, CoordinatorMetricsSnapshot};
pub use ports::{OrderStore, PartialFillApi, ResolverSelector};
pub use service::PartialFillCoordinator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
