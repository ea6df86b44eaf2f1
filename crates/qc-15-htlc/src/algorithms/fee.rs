//! # Fee Estimation
//!
//! Linear size model: `size = 10 + inputs*148 + outputs*34`, `fee = size * rate`.
//! Pure and deterministic; overflow is reported, never wrapped.

use crate::domain::{FeeModel, HtlcError, MIN_FEE_RATE};

/// Estimates transaction size and fee from input/output counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeEstimator {
    model: FeeModel,
    min_fee_rate: u64,
}

impl Default for FeeEstimator {
    fn default() -> Self {
        Self::new(FeeModel::default(), MIN_FEE_RATE)
    }
}

impl FeeEstimator {
    /// Create an estimator with an explicit size model.
    pub fn new(model: FeeModel, min_fee_rate: u64) -> Self {
        Self {
            model,
            min_fee_rate: min_fee_rate.max(1),
        }
    }

    /// Estimated size in bytes.
    pub fn estimate_size(&self, input_count: u64, output_count: u64) -> Result<u64, HtlcError> {
        if input_count == 0 {
            return Err(HtlcError::InvalidParameter(
                "input_count must be at least 1".into(),
            ));
        }
        if output_count == 0 {
            return Err(HtlcError::InvalidParameter(
                "output_count must be at least 1".into(),
            ));
        }

        input_count
            .checked_mul(self.model.per_input)
            .and_then(|inputs| {
                output_count
                    .checked_mul(self.model.per_output)
                    .and_then(|outputs| inputs.checked_add(outputs))
            })
            .and_then(|body| body.checked_add(self.model.fixed_overhead))
            .ok_or_else(|| HtlcError::InvalidParameter("transaction size overflows".into()))
    }

    /// Fee for a transaction of the given shape at `fee_rate` units/byte.
    pub fn estimate_fee(
        &self,
        input_count: u64,
        output_count: u64,
        fee_rate: u64,
    ) -> Result<u64, HtlcError> {
        if fee_rate < self.min_fee_rate {
            return Err(HtlcError::InvalidParameter(format!(
                "fee_rate {fee_rate} below minimum {}",
                self.min_fee_rate
            )));
        }
        let size = self.estimate_size(input_count, output_count)?;
        size.checked_mul(fee_rate)
            .ok_or_else(|| HtlcError::InvalidParameter("fee overflows".into()))
    }
}

/// Fee under the default size model.
pub fn estimate_fee(input_count: u64, output_count: u64, fee_rate: u64) -> Result<u64, HtlcError> {
    FeeEstimator::default().estimate_fee(input_count, output_count, fee_rate)
}
