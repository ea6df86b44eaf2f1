//! # Inbound Ports
//!
//! APIs this subsystem exposes to the swap orchestration layer.

use crate::domain::{
    HtlcError, HtlcSpend, OutPointKey, RedeemParams, RefundParams, SecretHash, SecretStats,
    SecureSecret, Timestamp, UtxoState,
};

/// Spend construction API.
pub trait HtlcSpendApi: Send + Sync {
    /// Spend the secret branch.
    fn build_redeem_transaction(&self, params: RedeemParams) -> Result<HtlcSpend, HtlcError>;

    /// Spend the timelock branch, or fee-bump an earlier refund.
    fn build_refund_transaction(&self, params: RefundParams) -> Result<HtlcSpend, HtlcError>;

    /// Record that the spend of `key` was mined.
    fn confirm_spend(&self, key: &OutPointKey) -> Result<(), HtlcError>;

    /// Unspent or Spent.
    fn spend_state(&self, key: &OutPointKey) -> UtxoState;
}

/// Secret lifecycle API.
pub trait SecretManagerApi: Send + Sync {
    /// `count` fresh, distinct secrets, none already active.
    fn generate_many(&self, count: usize) -> Result<Vec<SecureSecret>, HtlcError>;

    /// hash160 of each secret, order preserved.
    fn hash_all(&self, secrets: &[SecureSecret]) -> Vec<SecretHash>;

    /// Store secrets with their hashes.
    fn store(
        &self,
        secrets: &[SecureSecret],
        hashes: &[SecretHash],
        expires_at: Option<Timestamp>,
    ) -> Result<(), HtlcError>;

    /// Store secrets expiring `ttl_ms` from now.
    fn store_with_expiration(
        &self,
        secrets: &[SecureSecret],
        hashes: &[SecretHash],
        ttl_ms: u64,
    ) -> Result<(), HtlcError>;

    /// Stored hash per secret, `None` when absent or expired.
    fn lookup_hashes(&self, secrets: &[SecureSecret]) -> Vec<Option<SecretHash>>;

    /// Recompute-and-compare, independent of the store.
    fn validate(&self, secret: &SecureSecret, claimed: &SecretHash) -> bool;

    /// Present in the store and unexpired.
    fn is_active(&self, secret: &SecureSecret) -> bool;

    /// Retire `old` and activate `new` in one step. Returns the new hashes.
    fn rotate(
        &self,
        old: &[SecureSecret],
        new: &[SecureSecret],
        expires_at: Option<Timestamp>,
    ) -> Result<Vec<SecretHash>, HtlcError>;

    /// Batch statistics.
    fn stats(&self, secrets: &[SecureSecret]) -> SecretStats;

    /// Sweep expired entries.
    fn purge_expired(&self) -> usize;
}
