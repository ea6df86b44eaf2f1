//! # QC-15 HTLC Spend Construction
//!
//! Builds redeem and refund spends of hash-time-locked outputs on a UTXO
//! chain, and manages the single-use secrets those outputs are locked to.
//!
//! **Subsystem ID:** 15
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Components
//!
//! | Component | Role |
//! |-----------|------|
//! | `FeeEstimator` | Linear size model, checked fee arithmetic |
//! | `SecretManager` | Generate, hash, store, expire and rotate secrets |
//! | `HtlcTransactionBuilder` | Redeem/refund spends, double-spend prevention, fee bumps |
//!
//! ## Safety Rules
//!
//! | Rule | Enforcement |
//! |------|-------------|
//! | One spend per outpoint | Check-and-set in `SpendLedger` |
//! | No dust outputs | Value checked before and after fees |
//! | Refund only after locktime | Clock check plus on-chain `OP_CHECKLOCKTIMEVERIFY` |
//! | Secret must open the lock | Commitment read from the script and recomputed |
//! | Secrets never leave memory raw | `SecureSecret` zeroizes on drop, `Debug` is redacted |
//!
//! ## Module Structure
//!
//! ```text
//! qc-15-htlc/
//! ├── domain/          # Utxo, SpendRecord, SecretHash, config, errors
//! ├── algorithms/      # Fees, secrets, HTLC scripts
//! ├── ports/           # HtlcSpendApi, SecretManagerApi, SpendLedger, SecretStore
//! ├── adapters/        # In-memory stores, extractors, local signer, manual clock
//! └── service/         # HtlcTransactionBuilder, SecretManager
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    InMemorySecretStore, InMemorySpendLedger, LocalKeySigner, ManualTimeSource,
    StandardHtlcExtractor,
};
#[cfg(any(test, feature = "unchecked-scripts"))]
pub use adapters::UncheckedCommitmentExtractor;
pub use algorithms::{
    build_htlc_script, estimate_fee, extract_commitment, generate_random_secret, hash160,
    htlc_address, FeeEstimator,
};
pub use domain::{
    FeeModel, HashCommitment, HtlcConfig, HtlcError, HtlcScriptParams, HtlcSpend, OutPointKey,
    RedeemParams, RefundParams, SecretHash, SecretStats, SecureSecret, SpendKind, SpendRecord,
    Timestamp, Utxo, UtxoState, DUST_THRESHOLD, MAX_SECRETS_PER_BATCH,
};
pub use metrics::{HtlcMetrics, HtlcMetricsSnapshot};
pub use ports::{
    HtlcSpendApi, ScriptCommitmentExtractor, SecretManagerApi, SecretStore, SpendLedger,
    SystemTimeSource, TimeSource, TransactionSigner,
};
pub use service::{HtlcTransactionBuilder, SecretManager};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
