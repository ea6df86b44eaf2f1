//! # Domain Errors
//!
//! Error types for HTLC spend construction and secret management.
//!
//! Errors fall into three groups:
//! - structural validation (caller-fixable, never retried internally)
//! - state conflicts (lost race or unmet precondition)
//! - cryptographic validation (fatal to the attempt)

use thiserror::Error;

/// Hash type (32-byte SHA-256).
pub type Hash = [u8; 32];

/// HTLC subsystem error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HtlcError {
    /// Parameter outside its accepted domain.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Batch size outside the permitted range.
    #[error("Out of range: {value} not in [{min}, {max}]")]
    OutOfRange {
        /// Requested value
        value: usize,
        /// Inclusive lower bound
        min: usize,
        /// Inclusive upper bound
        max: usize,
    },

    /// UTXO failed structural validation.
    #[error("Invalid UTXO: {0}")]
    InvalidUtxo(String),

    /// Value (before or after fees) is below the dust threshold.
    #[error("Value {value} below dust threshold {threshold}")]
    BelowDustThreshold {
        /// Offending value in satoshis
        value: u64,
        /// Dust threshold in satoshis
        threshold: u64,
    },

    /// Secret is not 64 hex characters.
    #[error("Invalid secret format: expected 64 hex characters")]
    InvalidSecretFormat,

    /// The outpoint was already consumed by a redeem or refund.
    #[error("UTXO already spent: {0}")]
    UtxoAlreadySpent(String),

    /// Secret does not hash to the committed value.
    #[error("Secret does not match committed hash")]
    SecretMismatch,

    /// Script could not be decompiled into a known HTLC shape.
    #[error("Unrecognized HTLC script: {0}")]
    UnrecognizedScript(String),

    /// Refund attempted before the absolute locktime.
    #[error("Locktime not expired: now={now}, locktime={locktime}")]
    LocktimeNotExpired {
        /// Current time (unix seconds)
        now: u64,
        /// Script locktime
        locktime: u64,
    },

    /// Destination address does not parse or belongs to another network.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Fee-bump replacement target is not an unconfirmed, replaceable refund.
    #[error("Invalid replacement: {0}")]
    InvalidReplacement(String),

    /// Secret is already active in the working set.
    #[error("Duplicate secret (hash {0})")]
    DuplicateSecret(String),

    /// Injected signer failed.
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

impl HtlcError {
    /// Whether the same call may legitimately succeed later.
    ///
    /// Only an unexpired locktime resolves itself with time; everything else
    /// must not be retried with the same arguments.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LocktimeNotExpired { .. })
    }
}
