//! Counters for partial-fill coordination.

use std::sync::atomic::{AtomicU64, Ordering};

/// Coordinator counters.
#[derive(Debug, Default)]
pub struct CoordinatorMetrics {
    /// Orders created
    pub orders_created: AtomicU64,
    /// Orders cancelled
    pub orders_cancelled: AtomicU64,
    /// Partial orders executed
    pub partial_fills_executed: AtomicU64,
    /// Execution attempts that lost to an earlier execution
    pub execution_races_lost: AtomicU64,
    /// Resolvers reported failed
    pub resolver_failures: AtomicU64,
    /// Failed-resolver reassignments
    pub reassignments: AtomicU64,
}

/// Point-in-time copy of [`CoordinatorMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorMetricsSnapshot {
    /// Orders created
    pub orders_created: u64,
    /// Orders cancelled
    pub orders_cancelled: u64,
    /// Partial orders executed
    pub partial_fills_executed: u64,
    /// Execution races lost
    pub execution_races_lost: u64,
    /// Resolver failures
    pub resolver_failures: u64,
    /// Reassignments
    pub reassignments: u64,
}

impl CoordinatorMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment a counter by one.
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> CoordinatorMetricsSnapshot {
        CoordinatorMetricsSnapshot {
            orders_created: self.orders_created.load(Ordering::Relaxed),
            orders_cancelled: self.orders_cancelled.load(Ordering::Relaxed),
            partial_fills_executed: self.partial_fills_executed.load(Ordering::Relaxed),
            execution_races_lost: self.execution_races_lost.load(Ordering::Relaxed),
            resolver_failures: self.resolver_failures.load(Ordering::Relaxed),
            reassignments: self.reassignments.load(Ordering::Relaxed),
        }
    }
}
