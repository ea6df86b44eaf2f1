//! # HTLC Configuration
//!
//! Tunables for fee estimation and secret batching. Defaults are the
//! interop constants; `from_env` applies `QC_HTLC_*` overrides.

use super::errors::HtlcError;
use super::invariants::{
    DEFAULT_FEE_RATE, DUST_THRESHOLD, MAX_SECRETS_PER_BATCH, MIN_FEE_RATE, REPLACEMENT_FEE_RATE,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Linear transaction size model: `fixed + inputs*per_input + outputs*per_output`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeModel {
    /// Version, locktime and count overhead (bytes).
    pub fixed_overhead: u64,
    /// Bytes per input.
    pub per_input: u64,
    /// Bytes per output.
    pub per_output: u64,
}

impl Default for FeeModel {
    fn default() -> Self {
        Self {
            fixed_overhead: 10,
            per_input: 148,
            per_output: 34,
        }
    }
}

/// Configuration for the HTLC subsystem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtlcConfig {
    /// Dust threshold (satoshis).
    pub dust_threshold: u64,
    /// Minimum accepted fee rate.
    pub min_fee_rate: u64,
    /// Fee rate for first-time spends.
    pub default_fee_rate: u64,
    /// Fee rate for replacements.
    pub replacement_fee_rate: u64,
    /// Max secrets per `generate_many`.
    pub max_secrets_per_batch: usize,
    /// Size model used by the fee estimator.
    pub fee_model: FeeModel,
}

impl Default for HtlcConfig {
    fn default() -> Self {
        Self {
            dust_threshold: DUST_THRESHOLD,
            min_fee_rate: MIN_FEE_RATE,
            default_fee_rate: DEFAULT_FEE_RATE,
            replacement_fee_rate: REPLACEMENT_FEE_RATE,
            max_secrets_per_batch: MAX_SECRETS_PER_BATCH,
            fee_model: FeeModel::default(),
        }
    }
}

impl HtlcConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// Recognised: `QC_HTLC_DUST_THRESHOLD`, `QC_HTLC_MIN_FEE_RATE`,
    /// `QC_HTLC_DEFAULT_FEE_RATE`, `QC_HTLC_REPLACEMENT_FEE_RATE`,
    /// `QC_HTLC_MAX_SECRETS_PER_BATCH`.
    pub fn from_env() -> Result<Self, HtlcError> {
        let defaults = Self::default();
        let config = Self {
            dust_threshold: env_or("QC_HTLC_DUST_THRESHOLD", defaults.dust_threshold)?,
            min_fee_rate: env_or("QC_HTLC_MIN_FEE_RATE", defaults.min_fee_rate)?,
            default_fee_rate: env_or("QC_HTLC_DEFAULT_FEE_RATE", defaults.default_fee_rate)?,
            replacement_fee_rate: env_or(
                "QC_HTLC_REPLACEMENT_FEE_RATE",
                defaults.replacement_fee_rate,
            )?,
            max_secrets_per_batch: env_or(
                "QC_HTLC_MAX_SECRETS_PER_BATCH",
                defaults.max_secrets_per_batch,
            )?,
            fee_model: defaults.fee_model,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), HtlcError> {
        if self.min_fee_rate == 0 {
            return Err(HtlcError::InvalidParameter(
                "min_fee_rate must be at least 1".into(),
            ));
        }
        if self.default_fee_rate < self.min_fee_rate {
            return Err(HtlcError::InvalidParameter(
                "default_fee_rate below min_fee_rate".into(),
            ));
        }
        if self.replacement_fee_rate <= self.default_fee_rate {
            return Err(HtlcError::InvalidParameter(
                "replacement_fee_rate must exceed default_fee_rate".into(),
            ));
        }
        if self.fee_model.per_input == 0 || self.fee_model.per_output == 0 {
            return Err(HtlcError::InvalidParameter(
                "fee model sizes must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, HtlcError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| HtlcError::InvalidParameter(format!("{key}={raw} is not a valid value"))),
        Err(_) => Ok(default),
    }
}
