//! # Coordinator Configuration

use super::errors::FillError;
use super::invariants::AMOUNT_TOLERANCE;
use super::value_objects::ExecutionPolicy;
use qc_15_htlc::MAX_SECRETS_PER_BATCH;
use serde::{Deserialize, Serialize};

/// Configuration for the partial-fill coordinator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Tolerance for the amount-sum invariant.
    pub amount_tolerance: f64,
    /// Who may execute a partial order.
    pub execution_policy: ExecutionPolicy,
    /// Max partial orders per order (one secret each).
    pub max_partials_per_order: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            amount_tolerance: AMOUNT_TOLERANCE,
            execution_policy: ExecutionPolicy::default(),
            max_partials_per_order: MAX_SECRETS_PER_BATCH,
        }
    }
}

impl CoordinatorConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), FillError> {
        if !self.amount_tolerance.is_finite() || self.amount_tolerance < 0.0 {
            return Err(FillError::InvalidParameter(
                "amount_tolerance must be finite and non-negative".into(),
            ));
        }
        if self.max_partials_per_order == 0 {
            return Err(FillError::InvalidParameter(
                "max_partials_per_order must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
