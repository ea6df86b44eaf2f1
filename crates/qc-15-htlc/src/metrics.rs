//! Counters for HTLC spend construction.
//!
//! Thread-safe; read via `snapshot()`.

use std::sync::atomic::{AtomicU64, Ordering};

/// Builder and secret-manager counters.
#[derive(Debug, Default)]
pub struct HtlcMetrics {
    /// Redeems built
    pub redeems_built: AtomicU64,
    /// Refunds built (replacements included)
    pub refunds_built: AtomicU64,
    /// Fee-bump replacements built
    pub replacements_built: AtomicU64,
    /// Attempts rejected because the outpoint was already spent
    pub double_spend_rejections: AtomicU64,
    /// Secrets that failed verification against a commitment
    pub secret_mismatches: AtomicU64,
    /// Secrets generated
    pub secrets_generated: AtomicU64,
}

/// Point-in-time copy of [`HtlcMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtlcMetricsSnapshot {
    /// Redeems built
    pub redeems_built: u64,
    /// Refunds built
    pub refunds_built: u64,
    /// Replacements built
    pub replacements_built: u64,
    /// Double-spend rejections
    pub double_spend_rejections: u64,
    /// Secret mismatches
    pub secret_mismatches: u64,
    /// Secrets generated
    pub secrets_generated: u64,
}

impl HtlcMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a built redeem
    pub fn record_redeem(&self) {
        self.redeems_built.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a built refund
    pub fn record_refund(&self, replacement: bool) {
        self.refunds_built.fetch_add(1, Ordering::Relaxed);
        if replacement {
            self.replacements_built.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a lost spend race or repeat attempt
    pub fn record_double_spend(&self) {
        self.double_spend_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a secret that failed its commitment check
    pub fn record_secret_mismatch(&self) {
        self.secret_mismatches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record generated secrets
    pub fn record_secrets_generated(&self, count: usize) {
        self.secrets_generated
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> HtlcMetricsSnapshot {
        HtlcMetricsSnapshot {
            redeems_built: self.redeems_built.load(Ordering::Relaxed),
            refunds_built: self.refunds_built.load(Ordering::Relaxed),
            replacements_built: self.replacements_built.load(Ordering::Relaxed),
            double_spend_rejections: self.double_spend_rejections.load(Ordering::Relaxed),
            secret_mismatches: self.secret_mismatches.load(Ordering::Relaxed),
            secrets_generated: self.secrets_generated.load(Ordering::Relaxed),
        }
    }
}
