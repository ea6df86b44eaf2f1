//! In-memory order store.
//!
//! Implements `OrderStore` with copy-on-write updates under a single
//! `parking_lot` mutex. Bid ledgers live inside the orders, so they share
//! that lock.

use crate::domain::{FillError, PartialFillOrder};
use crate::ports::{OrderMutation, OrderStore};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Process-local order store.
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<HashMap<String, PartialFillOrder>>,
}

impl InMemoryOrderStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderStore for InMemoryOrderStore {
    fn insert(&self, order: PartialFillOrder) -> Result<(), FillError> {
        let mut orders = self.orders.lock();
        if orders.contains_key(&order.id) {
            return Err(FillError::DuplicateOrder(order.id));
        }
        orders.insert(order.id.clone(), order);
        Ok(())
    }

    fn get(&self, order_id: &str) -> Option<PartialFillOrder> {
        self.orders.lock().get(order_id).cloned()
    }

    fn update(
        &self,
        order_id: &str,
        mutation: &mut OrderMutation<'_>,
    ) -> Result<PartialFillOrder, FillError> {
        let mut orders = self.orders.lock();
        let current = orders
            .get_mut(order_id)
            .ok_or_else(|| FillError::NotFound(order_id.to_string()))?;

        let mut draft = current.clone();
        mutation(&mut draft)?;
        *current = draft.clone();
        Ok(draft)
    }

    fn len(&self) -> usize {
        self.orders.lock().len()
    }
}
