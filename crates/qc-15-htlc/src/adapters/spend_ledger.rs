//! In-memory spend ledger.
//!
//! Implements `SpendLedger`; each check-and-set runs under one mutex.

use crate::domain::{HtlcError, OutPointKey, SpendRecord, UtxoState};
use crate::ports::SpendLedger;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

/// Process-local spend ledger.
#[derive(Default)]
pub struct InMemorySpendLedger {
    spent: Mutex<HashMap<OutPointKey, SpendRecord>>,
}

impl InMemorySpendLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpendLedger for InMemorySpendLedger {
    fn state(&self, key: &OutPointKey) -> UtxoState {
        if self.spent.lock().contains_key(key) {
            UtxoState::Spent
        } else {
            UtxoState::Unspent
        }
    }

    fn record(&self, key: &OutPointKey) -> Option<SpendRecord> {
        self.spent.lock().get(key).cloned()
    }

    fn try_mark_spent(&self, key: OutPointKey, record: SpendRecord) -> Result<(), SpendRecord> {
        let mut spent = self.spent.lock();
        if let Some(existing) = spent.get(&key) {
            return Err(existing.clone());
        }
        debug!("[qc-15] {} marked spent by {:?} {}", key, record.kind, record.txid);
        spent.insert(key, record);
        Ok(())
    }

    fn try_replace(
        &self,
        key: &OutPointKey,
        expected_txid: &str,
        replacement: SpendRecord,
    ) -> Result<(), HtlcError> {
        let mut spent = self.spent.lock();
        let current = spent
            .get_mut(key)
            .ok_or_else(|| HtlcError::InvalidReplacement(format!("no spend recorded for {key}")))?;

        if !current.is_replaceable_refund() {
            return Err(HtlcError::InvalidReplacement(format!(
                "spend of {key} is not an unconfirmed replaceable refund"
            )));
        }
        if !current.txid.eq_ignore_ascii_case(expected_txid) {
            return Err(HtlcError::InvalidReplacement(format!(
                "{expected_txid} is not the current spend of {key}"
            )));
        }

        debug!("[qc-15] {} replacing {} with {}", key, current.txid, replacement.txid);
        *current = replacement;
        Ok(())
    }

    fn mark_confirmed(&self, key: &OutPointKey) -> Result<(), HtlcError> {
        let mut spent = self.spent.lock();
        let record = spent
            .get_mut(key)
            .ok_or_else(|| HtlcError::InvalidParameter(format!("no spend recorded for {key}")))?;
        record.confirmed = true;
        Ok(())
    }

    fn len(&self) -> usize {
        self.spent.lock().len()
    }
}
