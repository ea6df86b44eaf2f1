//! # Secret Generation and Hashing
//!
//! CSPRNG preimages and the hashes they are committed under.

use crate::domain::{Hash, SecretHash, SecureSecret, SECRET_LEN};
use bitcoin::hashes::{hash160, Hash as _};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Domain tag for store fingerprints, so a fingerprint never equals an
/// on-chain SHA-256 commitment of the same secret.
const FINGERPRINT_TAG: &[u8] = b"qc-15/secret-store/v1";

/// Generate a cryptographically secure random secret.
pub fn generate_random_secret() -> SecureSecret {
    let mut bytes = [0u8; SECRET_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    let secret = SecureSecret::new(bytes);
    zeroize::Zeroize::zeroize(&mut bytes);
    secret
}

/// Generate `count` pairwise-distinct secrets.
pub fn generate_secrets(count: usize) -> Vec<SecureSecret> {
    let mut seen = HashSet::with_capacity(count);
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let secret = generate_random_secret();
        if seen.insert(secret_fingerprint(&secret)) {
            out.push(secret);
        }
    }
    out
}

/// hash160 (SHA-256 then RIPEMD-160).
pub fn hash160(data: &[u8]) -> SecretHash {
    SecretHash(hash160::Hash::hash(data).to_byte_array())
}

/// Plain SHA-256.
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Key a secret is stored under. Never the raw secret.
pub fn secret_fingerprint(secret: &SecureSecret) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(FINGERPRINT_TAG);
    hasher.update(secret.as_bytes());
    hasher.finalize().into()
}

/// Recompute hash160 and compare.
pub fn verify_secret(secret: &SecureSecret, claimed: &SecretHash) -> bool {
    hash160(secret.as_bytes()) == *claimed
}
