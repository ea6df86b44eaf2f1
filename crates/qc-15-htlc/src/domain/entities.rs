//! # Domain Entities
//!
//! UTXOs, spend requests and the records the builder keeps about them.

use super::value_objects::{OutPointKey, SecretHash, SpendKind};
use bitcoin::{Network, PublicKey, ScriptBuf, Transaction};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Millisecond timestamp.
pub type Timestamp = u64;

/// An HTLC-locked output on the UTXO chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utxo {
    /// Funding transaction id (64 hex chars).
    pub txid: String,
    /// Output index in the funding transaction.
    pub vout: u32,
    /// Output value in satoshis.
    pub value: u64,
    /// Locking script of the output.
    pub script_pubkey: ScriptBuf,
}

impl Utxo {
    /// Ledger key for this output.
    pub fn key(&self) -> OutPointKey {
        OutPointKey::new(&self.txid, self.vout)
    }
}

/// What the spend ledger remembers about a consumed outpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendRecord {
    /// Branch used.
    pub kind: SpendKind,
    /// Txid of the latest spend built for the outpoint.
    pub txid: String,
    /// Whether the spend signalled replaceability.
    pub replaceable: bool,
    /// Set once the caller reports the spend as mined.
    pub confirmed: bool,
    /// When the record was written (ms).
    pub recorded_at: Timestamp,
}

impl SpendRecord {
    /// A refund that may still be fee-bumped.
    pub fn is_replaceable_refund(&self) -> bool {
        self.kind == SpendKind::Refund && self.replaceable && !self.confirmed
    }
}

/// A built, signed spend.
#[derive(Clone, Debug)]
pub struct HtlcSpend {
    /// The transaction, ready to broadcast.
    pub transaction: Transaction,
    /// Its txid (hex).
    pub txid: String,
    /// Branch used.
    pub kind: SpendKind,
    /// Absolute fee in satoshis.
    pub fee: u64,
    /// Value paid to the destination.
    pub output_amount: u64,
    /// Fee rate used.
    pub fee_rate: u64,
    /// Txid this spend replaces, for fee bumps.
    pub replaces: Option<String>,
}

/// Arguments for the redeem path.
#[derive(Clone, Debug)]
pub struct RedeemParams {
    /// Output being spent.
    pub utxo: Utxo,
    /// Hex-encoded preimage.
    pub secret: Zeroizing<String>,
    /// Key of the receiving party (signs the redeem).
    pub receiver_key: PublicKey,
    /// Destination address.
    pub redeem_address: String,
    /// Witness script of the HTLC.
    pub htlc_script: ScriptBuf,
    /// Network the address must belong to.
    pub network: Network,
}

/// Arguments for the refund path.
#[derive(Clone, Debug)]
pub struct RefundParams {
    /// Output being spent.
    pub utxo: Utxo,
    /// Key of the funding party (signs the refund).
    pub sender_key: PublicKey,
    /// Destination address.
    pub refund_address: String,
    /// Witness script of the HTLC.
    pub htlc_script: ScriptBuf,
    /// Absolute locktime (unix seconds).
    pub locktime: u32,
    /// Network the address must belong to.
    pub network: Network,
    /// Signal replaceability on the input.
    pub enable_replacement: bool,
    /// Txid of the unconfirmed refund this one bumps.
    pub replaces: Option<String>,
}

/// Inputs for HTLC script construction.
#[derive(Clone, Debug)]
pub struct HtlcScriptParams {
    /// Hash locked into the redeem branch.
    pub commitment: super::value_objects::HashCommitment,
    /// Key that may redeem with the secret.
    pub receiver_key: PublicKey,
    /// Key that may refund after the locktime.
    pub sender_key: PublicKey,
    /// Absolute locktime (unix seconds).
    pub locktime: u32,
}

/// Secret store entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SecretEntry {
    /// hash160 of the secret.
    pub hash: SecretHash,
    /// Expiry (ms); `None` never expires.
    pub expires_at: Option<Timestamp>,
}

impl SecretEntry {
    /// Expired entries are evicted on first observation.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Summary statistics over a batch of secrets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SecretStats {
    /// Number of secrets.
    pub count: usize,
    /// Mean string length.
    pub average_length: f64,
    /// Distinct secrets.
    pub unique_count: usize,
    /// `unique_count / count`, 0 for an empty batch.
    pub entropy_score: f64,
}
