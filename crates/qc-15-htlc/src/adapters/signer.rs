//! Local-key signer.
//!
//! Holds secp256k1 keys in memory. Suitable for tests and regtest tooling;
//! production signing belongs to the wallet layer behind `TransactionSigner`.

use crate::domain::HtlcError;
use crate::ports::TransactionSigner;
use bitcoin::secp256k1::{All, Message, Secp256k1, SecretKey};
use bitcoin::sighash::EcdsaSighashType;
use bitcoin::PublicKey;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Signs with keys registered in-process.
pub struct LocalKeySigner {
    secp: Secp256k1<All>,
    keys: RwLock<HashMap<PublicKey, SecretKey>>,
}

impl Default for LocalKeySigner {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalKeySigner {
    /// Create a signer with no keys.
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// Register a secret key. Returns its public key.
    pub fn add_key(&self, secret_key: SecretKey) -> PublicKey {
        let public_key = PublicKey::new(secret_key.public_key(&self.secp));
        self.keys.write().insert(public_key, secret_key);
        public_key
    }
}

impl TransactionSigner for LocalKeySigner {
    fn sign(&self, sighash: &[u8; 32], key: &PublicKey) -> Result<Vec<u8>, HtlcError> {
        let keys = self.keys.read();
        let secret_key = keys
            .get(key)
            .ok_or_else(|| HtlcError::SigningFailed(format!("no key for {key}")))?;

        let message = Message::from_digest(*sighash);
        let signature = bitcoin::ecdsa::Signature {
            signature: self.secp.sign_ecdsa(&message, secret_key),
            sighash_type: EcdsaSighashType::All,
        };
        Ok(signature.to_vec())
    }
}
