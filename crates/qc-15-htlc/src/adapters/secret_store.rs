//! In-memory secret store keyed by secret fingerprint.

use crate::domain::{Hash, HtlcError, SecretEntry, Timestamp};
use crate::ports::SecretStore;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// Process-local secret store.
#[derive(Default)]
pub struct InMemorySecretStore {
    entries: Mutex<HashMap<Hash, SecretEntry>>,
}

impl InMemorySecretStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reject a batch that collides with itself or with live entries.
fn check_insertable(
    live: &HashMap<Hash, SecretEntry>,
    retiring: &HashSet<Hash>,
    entries: &[(Hash, SecretEntry)],
    now: Timestamp,
) -> Result<(), HtlcError> {
    let mut batch = HashSet::with_capacity(entries.len());
    for (fingerprint, entry) in entries {
        let active = !retiring.contains(fingerprint)
            && live.get(fingerprint).is_some_and(|e| !e.is_expired(now));
        if active || !batch.insert(*fingerprint) {
            return Err(HtlcError::DuplicateSecret(entry.hash.to_hex()));
        }
    }
    Ok(())
}

impl SecretStore for InMemorySecretStore {
    fn insert_all(
        &self,
        entries: Vec<(Hash, SecretEntry)>,
        now: Timestamp,
    ) -> Result<(), HtlcError> {
        let mut live = self.entries.lock();
        check_insertable(&live, &HashSet::new(), &entries, now)?;
        live.extend(entries);
        Ok(())
    }

    fn get(&self, fingerprint: &Hash, now: Timestamp) -> Option<SecretEntry> {
        let mut live = self.entries.lock();
        match live.get(fingerprint) {
            Some(entry) if entry.is_expired(now) => {
                live.remove(fingerprint);
                None
            }
            other => other.copied(),
        }
    }

    fn replace(
        &self,
        retire: &[Hash],
        entries: Vec<(Hash, SecretEntry)>,
        now: Timestamp,
    ) -> Result<(), HtlcError> {
        let mut live = self.entries.lock();
        let retiring: HashSet<Hash> = retire.iter().copied().collect();
        check_insertable(&live, &retiring, &entries, now)?;
        for fingerprint in &retiring {
            live.remove(fingerprint);
        }
        live.extend(entries);
        Ok(())
    }

    fn purge_expired(&self, now: Timestamp) -> usize {
        let mut live = self.entries.lock();
        let before = live.len();
        live.retain(|_, entry| !entry.is_expired(now));
        before - live.len()
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
