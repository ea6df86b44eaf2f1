//! # Adapters Layer
//!
//! In-process implementations of the outbound ports.

pub mod extractor;
pub mod secret_store;
pub mod signer;
pub mod spend_ledger;
pub mod time;

pub use extractor::StandardHtlcExtractor;
#[cfg(any(test, feature = "unchecked-scripts"))]
pub use extractor::UncheckedCommitmentExtractor;
pub use secret_store::InMemorySecretStore;
pub use signer::LocalKeySigner;
pub use spend_ledger::InMemorySpendLedger;
pub use time::ManualTimeSource;
