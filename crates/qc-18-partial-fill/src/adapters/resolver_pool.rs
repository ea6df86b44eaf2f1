//! Round-robin resolver selection.

use crate::domain::{FillError, PartialOrder, ResolverId};
use crate::ports::ResolverSelector;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// Rotates through a fixed resolver set, skipping resolvers that already
/// failed the partial order. With an empty set it mints `resolver_<uuid>` ids.
#[derive(Debug, Default)]
pub struct ResolverPool {
    resolvers: Vec<ResolverId>,
    cursor: AtomicUsize,
}

impl ResolverPool {
    /// Pool over the given resolver ids.
    pub fn new(resolvers: Vec<ResolverId>) -> Self {
        Self {
            resolvers,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Pool that mints a fresh id per selection.
    pub fn ephemeral() -> Self {
        Self::default()
    }
}

impl ResolverSelector for ResolverPool {
    fn select(&self, partial: &PartialOrder) -> Result<ResolverId, FillError> {
        if self.resolvers.is_empty() {
            return Ok(format!("resolver_{}", Uuid::new_v4()));
        }

        let len = self.resolvers.len();
        let start = self.cursor.fetch_add(1, Ordering::Relaxed);
        (0..len)
            .map(|offset| &self.resolvers[(start + offset) % len])
            .find(|candidate| !partial.failed_resolvers.contains(*candidate))
            .cloned()
            .ok_or_else(|| FillError::NoResolverAvailable(partial.id.clone()))
    }
}
