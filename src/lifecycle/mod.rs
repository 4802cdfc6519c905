//! Order lifecycle manager.
//!
//! Owns the validated operations on special orders: creation, full-record
//! correction, status transitions, payment updates and deletion. State-machine
//! decisions are pure functions on a fetched snapshot (see
//! [`crate::domain::SpecialOrder`]); this module adds the store round-trips
//! and serializes mutating operations per order.

mod error;

pub use error::LifecycleError;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::{
    Client, OrderDraft, OrderUpdate, SpecialOrder, StatusChange, Supplier, client_phone_for,
};
use crate::storage::OrderStore;

/// OrderManager drives the special-order state machine against a store.
///
/// The store is authoritative: every operation fetches, mutates a snapshot
/// and writes the whole record back in one statement. Only one mutating
/// operation per order runs at a time; reads are unrestricted.
pub struct OrderManager {
    store: Arc<dyn OrderStore>,

    // Mutation lock - prevents parallel mutations of the same order.
    updating_orders: RwLock<HashSet<i64>>,
}

impl OrderManager {
    /// Creates a manager on top of the given store.
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            store,
            updating_orders: RwLock::new(HashSet::new()),
        }
    }

    /// Registers a new special order. The order starts Pending; an initial
    /// deposit is recorded as-is and only later payment updates may relabel
    /// the order.
    pub async fn create_order(&self, draft: OrderDraft) -> Result<SpecialOrder, LifecycleError> {
        let order = draft.into_order(Utc::now())?;
        let stored = self.store.insert(&order).await?;

        info!(
            id = stored.id,
            client = %stored.client_name,
            brand = %stored.brand,
            model = %stored.model,
            sale_price = %stored.sale_price,
            "Special order created"
        );
        Ok(stored)
    }

    /// Applies a full-record correction. Re-validates every invariant and
    /// writes the status exactly as passed (administrative path, not a
    /// lifecycle transition).
    pub async fn update_order(
        &self,
        id: i64,
        update: OrderUpdate,
    ) -> Result<SpecialOrder, LifecycleError> {
        self.lock_order(id).await?;
        let result = self.update_order_locked(id, update).await;
        self.unlock_order(id).await;
        result
    }

    async fn update_order_locked(
        &self,
        id: i64,
        update: OrderUpdate,
    ) -> Result<SpecialOrder, LifecycleError> {
        let current = self.fetch(id).await?;
        let updated = update.apply_to(&current, Utc::now())?;
        self.store.update(&updated).await?;

        info!(id, status = %updated.status, "Special order corrected");
        Ok(updated)
    }

    /// Requests a status transition. Fails without touching the store when
    /// the transition is not allowed, the sold gate is unmet, or a required
    /// reason is missing.
    pub async fn transition_status(
        &self,
        id: i64,
        change: StatusChange,
    ) -> Result<SpecialOrder, LifecycleError> {
        self.lock_order(id).await?;
        let result = self.transition_status_locked(id, change).await;
        self.unlock_order(id).await;
        result
    }

    async fn transition_status_locked(
        &self,
        id: i64,
        change: StatusChange,
    ) -> Result<SpecialOrder, LifecycleError> {
        let current = self.fetch(id).await?;
        let from = current.status;
        let updated = current.apply_status(change, Utc::now())?;
        self.store.update(&updated).await?;

        info!(id, %from, to = %updated.status, "Order status changed");
        Ok(updated)
    }

    /// Sets the total amount the client has paid. May relabel the order
    /// PartialPayment per the derived-status rule.
    pub async fn update_payment(
        &self,
        id: i64,
        amount: Decimal,
    ) -> Result<SpecialOrder, LifecycleError> {
        self.lock_order(id).await?;
        let result = self.update_payment_locked(id, amount).await;
        self.unlock_order(id).await;
        result
    }

    async fn update_payment_locked(
        &self,
        id: i64,
        amount: Decimal,
    ) -> Result<SpecialOrder, LifecycleError> {
        let current = self.fetch(id).await?;
        let updated = current.apply_payment(amount, Utc::now())?;
        self.store.update(&updated).await?;

        info!(
            id,
            amount_paid = %updated.amount_paid,
            remaining = %updated.remaining_balance(),
            status = %updated.status,
            "Order payment updated"
        );
        Ok(updated)
    }

    /// Removes an order unconditionally. Irreversible administrative escape
    /// hatch; bypasses the state machine.
    pub async fn delete_order(&self, id: i64) -> Result<(), LifecycleError> {
        self.lock_order(id).await?;
        let result = self.delete_order_locked(id).await;
        self.unlock_order(id).await;
        result
    }

    async fn delete_order_locked(&self, id: i64) -> Result<(), LifecycleError> {
        match self.store.delete(id).await {
            Ok(()) => {
                info!(id, "Special order deleted");
                Ok(())
            }
            Err(crate::storage::StoreError::NotFound(_)) => Err(LifecycleError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetches the current order collection.
    pub async fn list_orders(&self) -> Result<Vec<SpecialOrder>, LifecycleError> {
        Ok(self.store.list().await?)
    }

    /// Fetches one order.
    pub async fn get_order(&self, id: i64) -> Result<SpecialOrder, LifecycleError> {
        self.fetch(id).await
    }

    /// Fetches the client directory for name auto-suggestion.
    pub async fn list_clients(&self) -> Result<Vec<Client>, LifecycleError> {
        Ok(self.store.list_clients().await?)
    }

    /// Fetches the supplier directory for name auto-suggestion.
    pub async fn list_suppliers(&self) -> Result<Vec<Supplier>, LifecycleError> {
        Ok(self.store.list_suppliers().await?)
    }

    /// Looks up a client's phone number by name.
    pub async fn client_phone(&self, name: &str) -> Result<Option<String>, LifecycleError> {
        let clients = self.store.list_clients().await?;
        Ok(client_phone_for(&clients, name).map(String::from))
    }

    async fn fetch(&self, id: i64) -> Result<SpecialOrder, LifecycleError> {
        self.store
            .get(id)
            .await?
            .ok_or(LifecycleError::NotFound(id))
    }

    /// Acquires the per-order mutation lock.
    async fn lock_order(&self, id: i64) -> Result<(), LifecycleError> {
        let mut orders = self.updating_orders.write().await;
        if !orders.insert(id) {
            return Err(LifecycleError::UpdateInFlight(id));
        }
        Ok(())
    }

    /// Releases the per-order mutation lock.
    async fn unlock_order(&self, id: i64) {
        let mut orders = self.updating_orders.write().await;
        orders.remove(&id);
    }
}

#[cfg(test)]
mod tests;
