//! # Secret Manager
//!
//! Generates, hashes, stores, expires and rotates single-use swap secrets.
//!
//! Secrets are stored under a tagged SHA-256 fingerprint, never raw. A
//! secret that is active in the store cannot be stored again, so one
//! preimage can never back two live orders.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::algorithms::{generate_secrets, hash160, secret_fingerprint, verify_secret};
use crate::domain::{
    Hash, HtlcConfig, HtlcError, SecretEntry, SecretHash, SecretStats, SecureSecret, Timestamp,
};
use crate::metrics::HtlcMetrics;
use crate::ports::{SecretManagerApi, SecretStore, TimeSource};

/// Store-backed secret lifecycle.
pub struct SecretManager {
    store: Arc<dyn SecretStore>,
    clock: Arc<dyn TimeSource>,
    max_batch: usize,
    metrics: Arc<HtlcMetrics>,
}

impl SecretManager {
    /// Create a manager with default limits.
    pub fn new(store: Arc<dyn SecretStore>, clock: Arc<dyn TimeSource>) -> Self {
        Self::with_config(&HtlcConfig::default(), store, clock)
    }

    /// Create a manager using `config.max_secrets_per_batch`.
    pub fn with_config(
        config: &HtlcConfig,
        store: Arc<dyn SecretStore>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            store,
            clock,
            max_batch: config.max_secrets_per_batch,
            metrics: Arc::new(HtlcMetrics::new()),
        }
    }

    /// Share a metrics collector with other components.
    pub fn with_metrics(mut self, metrics: Arc<HtlcMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Pair each secret with its fingerprint and entry, checking hashes.
    fn entries(
        secrets: &[SecureSecret],
        hashes: &[SecretHash],
        expires_at: Option<Timestamp>,
    ) -> Result<Vec<(Hash, SecretEntry)>, HtlcError> {
        if secrets.len() != hashes.len() {
            return Err(HtlcError::InvalidParameter(format!(
                "{} secrets but {} hashes",
                secrets.len(),
                hashes.len()
            )));
        }
        secrets
            .iter()
            .zip(hashes)
            .map(|(secret, hash)| {
                if !verify_secret(secret, hash) {
                    return Err(HtlcError::SecretMismatch);
                }
                Ok((
                    secret_fingerprint(secret),
                    SecretEntry {
                        hash: *hash,
                        expires_at,
                    },
                ))
            })
            .collect()
    }
}

impl SecretManagerApi for SecretManager {
    fn generate_many(&self, count: usize) -> Result<Vec<SecureSecret>, HtlcError> {
        if count > self.max_batch {
            return Err(HtlcError::OutOfRange {
                value: count,
                min: 0,
                max: self.max_batch,
            });
        }

        let now = self.clock.now();
        let mut secrets = generate_secrets(count);
        // Never hand out a secret that is already live.
        for secret in secrets.iter_mut() {
            while self.store.get(&secret_fingerprint(secret), now).is_some() {
                *secret = crate::algorithms::generate_random_secret();
            }
        }

        self.metrics.record_secrets_generated(count);
        debug!("[qc-15] generated {} secrets", count);
        Ok(secrets)
    }

    fn hash_all(&self, secrets: &[SecureSecret]) -> Vec<SecretHash> {
        secrets.iter().map(|s| hash160(s.as_bytes())).collect()
    }

    fn store(
        &self,
        secrets: &[SecureSecret],
        hashes: &[SecretHash],
        expires_at: Option<Timestamp>,
    ) -> Result<(), HtlcError> {
        let entries = Self::entries(secrets, hashes, expires_at)?;
        self.store.insert_all(entries, self.clock.now())?;
        debug!(
            "[qc-15] stored {} secrets (expires_at={:?})",
            secrets.len(),
            expires_at
        );
        Ok(())
    }

    fn store_with_expiration(
        &self,
        secrets: &[SecureSecret],
        hashes: &[SecretHash],
        ttl_ms: u64,
    ) -> Result<(), HtlcError> {
        let expires_at = self.clock.now().saturating_add(ttl_ms);
        self.store(secrets, hashes, Some(expires_at))
    }

    fn lookup_hashes(&self, secrets: &[SecureSecret]) -> Vec<Option<SecretHash>> {
        let now = self.clock.now();
        secrets
            .iter()
            .map(|s| self.store.get(&secret_fingerprint(s), now).map(|e| e.hash))
            .collect()
    }

    fn validate(&self, secret: &SecureSecret, claimed: &SecretHash) -> bool {
        verify_secret(secret, claimed)
    }

    fn is_active(&self, secret: &SecureSecret) -> bool {
        self.store
            .get(&secret_fingerprint(secret), self.clock.now())
            .is_some()
    }

    fn rotate(
        &self,
        old: &[SecureSecret],
        new: &[SecureSecret],
        expires_at: Option<Timestamp>,
    ) -> Result<Vec<SecretHash>, HtlcError> {
        let hashes = self.hash_all(new);
        let entries = Self::entries(new, &hashes, expires_at)?;
        let retire: Vec<Hash> = old.iter().map(secret_fingerprint).collect();

        self.store.replace(&retire, entries, self.clock.now())?;
        info!(
            "[qc-15] rotated secrets: {} retired, {} activated",
            old.len(),
            new.len()
        );
        Ok(hashes)
    }

    fn stats(&self, secrets: &[SecureSecret]) -> SecretStats {
        let count = secrets.len();
        if count == 0 {
            return SecretStats {
                count: 0,
                average_length: 0.0,
                unique_count: 0,
                entropy_score: 0.0,
            };
        }

        let total_len: usize = secrets.iter().map(|s| s.to_hex().len()).sum();
        let unique_count = secrets
            .iter()
            .map(secret_fingerprint)
            .collect::<HashSet<_>>()
            .len();

        SecretStats {
            count,
            average_length: total_len as f64 / count as f64,
            unique_count,
            entropy_score: unique_count as f64 / count as f64,
        }
    }

    fn purge_expired(&self) -> usize {
        let removed = self.store.purge_expired(self.clock.now());
        if removed > 0 {
            debug!("[qc-15] purged {} expired secrets", removed);
        }
        removed
    }
}
