//! # Outbound Ports
//!
//! Dependencies the HTLC services are constructed with: clock, stores,
//! script introspection and signing.

use crate::domain::{
    CommitmentCheck, Hash, HtlcError, OutPointKey, SecretEntry, SpendRecord, Timestamp, UtxoState,
};
use bitcoin::{PublicKey, Script};

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// UTXO usage ledger.
///
/// Every mutating method is a single check-and-set; implementations must
/// perform it under one lock.
pub trait SpendLedger: Send + Sync {
    /// Current state of an outpoint.
    fn state(&self, key: &OutPointKey) -> UtxoState;

    /// Spend record for an outpoint, if any.
    fn record(&self, key: &OutPointKey) -> Option<SpendRecord>;

    /// Mark spent if unspent. On conflict returns the existing record.
    fn try_mark_spent(&self, key: OutPointKey, record: SpendRecord) -> Result<(), SpendRecord>;

    /// Swap the recorded txid of an unconfirmed, replaceable refund.
    ///
    /// Fails `InvalidReplacement` unless the current record is a
    /// replaceable, unconfirmed refund whose txid equals `expected_txid`.
    fn try_replace(
        &self,
        key: &OutPointKey,
        expected_txid: &str,
        replacement: SpendRecord,
    ) -> Result<(), HtlcError>;

    /// Mark the recorded spend as mined.
    fn mark_confirmed(&self, key: &OutPointKey) -> Result<(), HtlcError>;

    /// Number of spent outpoints.
    fn len(&self) -> usize;

    /// Whether no outpoint has been spent.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Active secret working set, keyed by fingerprint.
pub trait SecretStore: Send + Sync {
    /// Insert all entries or none.
    ///
    /// Fails `DuplicateSecret` if any fingerprint is already active or
    /// repeats within the batch. Expired entries are overwritten.
    fn insert_all(&self, entries: Vec<(Hash, SecretEntry)>, now: Timestamp)
        -> Result<(), HtlcError>;

    /// Look up an entry, evicting it if expired.
    fn get(&self, fingerprint: &Hash, now: Timestamp) -> Option<SecretEntry>;

    /// Remove `retire` and insert `entries` under one lock.
    ///
    /// Nothing changes if the insert would fail.
    fn replace(
        &self,
        retire: &[Hash],
        entries: Vec<(Hash, SecretEntry)>,
        now: Timestamp,
    ) -> Result<(), HtlcError>;

    /// Evict every expired entry. Returns how many were removed.
    fn purge_expired(&self, now: Timestamp) -> usize;

    /// Entries currently held, expired or not.
    fn len(&self) -> usize;

    /// Whether the store holds nothing.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Locates the hash commitment inside an HTLC script.
pub trait ScriptCommitmentExtractor: Send + Sync {
    /// Decide how the secret is to be checked against `script`.
    fn extract(&self, script: &Script) -> Result<CommitmentCheck, HtlcError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Signing capability, injected by the wallet layer.
pub trait TransactionSigner: Send + Sync {
    /// Sign a segwit-v0 sighash with the key behind `key`.
    ///
    /// Returns a DER signature with the sighash flag appended.
    fn sign(&self, sighash: &[u8; 32], key: &PublicKey) -> Result<Vec<u8>, HtlcError>;
}
