//! # Domain Value Objects
//!
//! Immutable value types for HTLC spends.

use bitcoin::hashes::{hash160, Hash as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Key of a UTXO: (transaction id, output index).
///
/// The txid is normalised to lowercase hex so equal outpoints always
/// collide in the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutPointKey {
    /// Transaction id (lowercase hex).
    pub txid: String,
    /// Output index.
    pub vout: u32,
}

impl OutPointKey {
    /// Create a key, normalising the txid.
    pub fn new(txid: &str, vout: u32) -> Self {
        Self {
            txid: txid.to_ascii_lowercase(),
            vout,
        }
    }
}

impl fmt::Display for OutPointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

/// hash160 of a secret (20 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretHash(pub [u8; 20]);

impl SecretHash {
    /// Lowercase hex, 40 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse 40 hex characters.
    pub fn from_hex(s: &str) -> Option<Self> {
        let mut out = [0u8; 20];
        hex::decode_to_slice(s, &mut out).ok()?;
        Some(Self(out))
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hash committed in the redeem branch of an HTLC script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashCommitment {
    /// `OP_SHA256 <32 bytes>`
    Sha256([u8; 32]),
    /// `OP_HASH160 <20 bytes>`
    Hash160([u8; 20]),
}

impl HashCommitment {
    /// Check a raw secret against the commitment.
    pub fn matches(&self, secret: &[u8]) -> bool {
        match self {
            Self::Sha256(expected) => {
                let digest: [u8; 32] = Sha256::digest(secret).into();
                &digest == expected
            }
            Self::Hash160(expected) => hash160::Hash::hash(secret).to_byte_array() == *expected,
        }
    }

    /// Committed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Sha256(h) => h,
            Self::Hash160(h) => h,
        }
    }
}

impl From<SecretHash> for HashCommitment {
    fn from(hash: SecretHash) -> Self {
        Self::Hash160(hash.0)
    }
}

/// Which branch of the HTLC a spend uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpendKind {
    /// Secret branch.
    Redeem,
    /// Timelock branch.
    Refund,
}

/// Per-UTXO state as seen by the builder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UtxoState {
    /// No spend has been built against the outpoint.
    #[default]
    Unspent,
    /// A redeem or refund has consumed the outpoint.
    Spent,
}

impl UtxoState {
    /// A spent outpoint never returns to `Unspent`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Spent)
    }
}

/// Result of script introspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitmentCheck {
    /// Verify the secret against this commitment.
    Verify(HashCommitment),
    /// Accept the secret without verification (non-production only).
    Skip,
}
