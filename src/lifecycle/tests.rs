//! Manager-level tests against a throwaway SQLite store.

use super::*;
use crate::domain::{
    CancellationReason, ItemType, OrderDraft, OrderError, OrderStatus, OrderUpdate,
    ReplacementReason,
};
use crate::storage::{SqliteStore, SqliteStoreConfig, StoreError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Mutex;
use tempfile::NamedTempFile;
use tokio::sync::Notify;

async fn test_manager() -> (OrderManager, NamedTempFile) {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteStore::new(SqliteStoreConfig {
        path: file.path().to_string_lossy().to_string(),
        max_connections: 2,
    })
    .await
    .unwrap();
    (OrderManager::new(Arc::new(store)), file)
}

fn draft(client: &str, sale: i64) -> OrderDraft {
    OrderDraft {
        client_name: client.to_string(),
        client_phone: Some("77 000 000".to_string()),
        supplier_name: "Moussa".to_string(),
        brand: "iPhone".to_string(),
        model: "15 PRO".to_string(),
        storage_capacity: Some("256 Go".to_string()),
        item_type: ItemType::Phone,
        carton_grade: None,
        imei: None,
        purchase_price: Decimal::from(600),
        sale_price: Decimal::from(sale),
        amount_paid: None,
    }
}

#[tokio::test]
async fn test_create_and_fetch_order() {
    let (manager, _db) = test_manager().await;

    let created = manager.create_order(draft("Aissata", 1000)).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.status, OrderStatus::Pending);

    let fetched = manager.get_order(created.id).await.unwrap();
    assert_eq!(fetched.client_name, "Aissata");
    assert_eq!(fetched.sale_price, Decimal::from(1000));
    assert_eq!(fetched.amount_paid, Decimal::ZERO);
    assert_eq!(fetched.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_create_rejects_invalid_draft() {
    let (manager, _db) = test_manager().await;

    let mut bad = draft("", 1000);
    bad.client_name = String::new();
    let err = manager.create_order(bad).await.unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::Order(OrderError::Validation(_))
    ));
    assert!(manager.list_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_transition_persists_to_store() {
    let (manager, _db) = test_manager().await;
    let order = manager.create_order(draft("Aissata", 1000)).await.unwrap();

    manager
        .transition_status(order.id, StatusChange::Ordered)
        .await
        .unwrap();
    manager
        .transition_status(order.id, StatusChange::Received)
        .await
        .unwrap();

    let fetched = manager.get_order(order.id).await.unwrap();
    assert_eq!(fetched.status, OrderStatus::Received);
    assert!(fetched.status_changed_date >= order.status_changed_date);
}

#[tokio::test]
async fn test_rejected_transition_leaves_store_unchanged() {
    let (manager, _db) = test_manager().await;
    let order = manager.create_order(draft("Aissata", 1000)).await.unwrap();

    // pending -> received is not an edge of the graph.
    let err = manager
        .transition_status(order.id, StatusChange::Received)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::Order(OrderError::InvalidTransition { .. })
    ));

    let fetched = manager.get_order(order.id).await.unwrap();
    assert_eq!(fetched.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_missing_reason_leaves_store_unchanged() {
    let (manager, _db) = test_manager().await;
    let order = manager.create_order(draft("Aissata", 1000)).await.unwrap();

    let err = manager
        .transition_status(
            order.id,
            StatusChange::Cancelled(CancellationReason::Other("  ".to_string())),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::Order(OrderError::MissingReason(_))
    ));

    let fetched = manager.get_order(order.id).await.unwrap();
    assert_eq!(fetched.status, OrderStatus::Pending);
    assert!(fetched.cancellation_reason.is_none());
}

#[tokio::test]
async fn test_payment_then_sale_flow() {
    let (manager, _db) = test_manager().await;
    let order = manager.create_order(draft("Aissata", 1000)).await.unwrap();

    let partial = manager
        .update_payment(order.id, Decimal::from(400))
        .await
        .unwrap();
    assert_eq!(partial.status, OrderStatus::PartialPayment);
    assert_eq!(partial.remaining_balance(), Decimal::from(600));

    // Not fully paid, cannot sell yet.
    let err = manager
        .transition_status(order.id, StatusChange::Sold)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::Order(OrderError::UnpaidBalance { .. })
    ));

    manager
        .update_payment(order.id, Decimal::from(1000))
        .await
        .unwrap();
    let sold = manager
        .transition_status(order.id, StatusChange::Sold)
        .await
        .unwrap();
    assert_eq!(sold.status, OrderStatus::Sold);

    let fetched = manager.get_order(order.id).await.unwrap();
    assert_eq!(fetched.status, OrderStatus::Sold);
    assert_eq!(fetched.remaining_balance(), Decimal::ZERO);
}

#[tokio::test]
async fn test_overpayment_rejected_and_not_persisted() {
    let (manager, _db) = test_manager().await;
    let order = manager.create_order(draft("Aissata", 1000)).await.unwrap();

    let err = manager
        .update_payment(order.id, Decimal::from(1200))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::Order(OrderError::InvalidAmount { .. })
    ));

    let fetched = manager.get_order(order.id).await.unwrap();
    assert_eq!(fetched.amount_paid, Decimal::ZERO);
    assert_eq!(fetched.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_sold_order_can_be_replaced() {
    let (manager, _db) = test_manager().await;
    let order = manager.create_order(draft("Aissata", 1000)).await.unwrap();

    manager
        .update_payment(order.id, Decimal::from(1000))
        .await
        .unwrap();
    // Full payment on a pending order does not relabel it; walk the graph.
    manager
        .transition_status(order.id, StatusChange::Ordered)
        .await
        .unwrap();
    manager
        .transition_status(order.id, StatusChange::Received)
        .await
        .unwrap();
    manager
        .transition_status(order.id, StatusChange::Sold)
        .await
        .unwrap();

    let replaced = manager
        .transition_status(
            order.id,
            StatusChange::Replaced(ReplacementReason::Defective),
        )
        .await
        .unwrap();
    assert_eq!(replaced.status, OrderStatus::Replaced);
    assert_eq!(
        replaced.replacement_reason,
        Some(ReplacementReason::Defective)
    );
}

#[tokio::test]
async fn test_delete_is_unconditional() {
    let (manager, _db) = test_manager().await;

    // Delete works in any status, even mid-lifecycle.
    let order = manager.create_order(draft("Aissata", 1000)).await.unwrap();
    manager
        .transition_status(order.id, StatusChange::Ordered)
        .await
        .unwrap();

    manager.delete_order(order.id).await.unwrap();

    let orders = manager.list_orders().await.unwrap();
    assert!(orders.iter().all(|o| o.id != order.id));
    assert!(matches!(
        manager.get_order(order.id).await.unwrap_err(),
        LifecycleError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_operations_on_missing_order_return_not_found() {
    let (manager, _db) = test_manager().await;

    assert!(matches!(
        manager.get_order(999).await.unwrap_err(),
        LifecycleError::NotFound(999)
    ));
    assert!(matches!(
        manager
            .transition_status(999, StatusChange::Ordered)
            .await
            .unwrap_err(),
        LifecycleError::NotFound(999)
    ));
    assert!(matches!(
        manager
            .update_payment(999, Decimal::from(10))
            .await
            .unwrap_err(),
        LifecycleError::NotFound(999)
    ));
    assert!(matches!(
        manager.delete_order(999).await.unwrap_err(),
        LifecycleError::NotFound(999)
    ));
}

#[tokio::test]
async fn test_full_record_correction() {
    let (manager, _db) = test_manager().await;
    let order = manager.create_order(draft("Aissata", 1000)).await.unwrap();

    let update = OrderUpdate {
        client_name: "Aissata".to_string(),
        client_phone: Some("77 111 111".to_string()),
        supplier_name: "Ousmane".to_string(),
        brand: "iPhone".to_string(),
        model: "15 PRO MAX".to_string(),
        storage_capacity: Some("512 Go".to_string()),
        item_type: ItemType::Phone,
        carton_grade: None,
        imei: Some("998877".to_string()),
        purchase_price: Decimal::from(700),
        sale_price: Decimal::from(1200),
        amount_paid: Decimal::from(200),
        status: OrderStatus::Pending,
        cancellation_reason: None,
        replacement_reason: None,
    };

    let corrected = manager.update_order(order.id, update).await.unwrap();
    assert_eq!(corrected.supplier_name, "Ousmane");
    assert_eq!(corrected.sale_price, Decimal::from(1200));
    assert_eq!(corrected.order_date, order.order_date);

    let fetched = manager.get_order(order.id).await.unwrap();
    assert_eq!(fetched.model, "15 PRO MAX");
    assert_eq!(fetched.amount_paid, Decimal::from(200));
}

/// In-memory store whose writes to order 1 park until released, so a test
/// can hold one mutation open while issuing others.
struct GatedStore {
    orders: Mutex<Vec<SpecialOrder>>,
    entered: Notify,
    release: Notify,
}

impl GatedStore {
    fn new(orders: Vec<SpecialOrder>) -> Self {
        Self {
            orders: Mutex::new(orders),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl OrderStore for GatedStore {
    async fn list(&self) -> Result<Vec<SpecialOrder>, StoreError> {
        Ok(self.orders.lock().unwrap().clone())
    }

    async fn get(&self, id: i64) -> Result<Option<SpecialOrder>, StoreError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn insert(&self, order: &SpecialOrder) -> Result<SpecialOrder, StoreError> {
        let mut orders = self.orders.lock().unwrap();
        let mut stored = order.clone();
        stored.id = orders.iter().map(|o| o.id).max().unwrap_or(0) + 1;
        orders.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, order: &SpecialOrder) -> Result<(), StoreError> {
        if order.id == 1 {
            self.entered.notify_one();
            self.release.notified().await;
        }
        let mut orders = self.orders.lock().unwrap();
        match orders.iter_mut().find(|o| o.id == order.id) {
            Some(slot) => {
                *slot = order.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("order {}", order.id))),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut orders = self.orders.lock().unwrap();
        let before = orders.len();
        orders.retain(|o| o.id != id);
        if orders.len() == before {
            return Err(StoreError::NotFound(format!("order {}", id)));
        }
        Ok(())
    }

    async fn list_clients(&self) -> Result<Vec<Client>, StoreError> {
        Ok(Vec::new())
    }

    async fn list_suppliers(&self) -> Result<Vec<Supplier>, StoreError> {
        Ok(Vec::new())
    }

    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_second_mutation_on_same_order_fails_fast() {
    let mut first = draft("Aissata", 1000).into_order(Utc::now()).unwrap();
    first.id = 1;
    let mut second = draft("Binta", 800).into_order(Utc::now()).unwrap();
    second.id = 2;

    let store = Arc::new(GatedStore::new(vec![first, second]));
    let manager = Arc::new(OrderManager::new(store.clone()));

    let background = manager.clone();
    let in_flight =
        tokio::spawn(async move { background.update_payment(1, Decimal::from(400)).await });

    // Wait until the first mutation holds the lock, parked inside the store.
    store.entered.notified().await;

    let err = manager
        .update_payment(1, Decimal::from(500))
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::UpdateInFlight(1)));

    // Other orders are not serialized behind it.
    manager
        .update_payment(2, Decimal::from(100))
        .await
        .unwrap();

    store.release.notify_one();
    let updated = in_flight.await.unwrap().unwrap();
    assert_eq!(updated.amount_paid, Decimal::from(400));
    assert_eq!(updated.status, OrderStatus::PartialPayment);

    // The lock is released once the first mutation finishes.
    store.release.notify_one();
    let again = manager
        .update_payment(1, Decimal::from(600))
        .await
        .unwrap();
    assert_eq!(again.amount_paid, Decimal::from(600));
}

#[tokio::test]
async fn test_empty_directories_on_fresh_store() {
    let (manager, _db) = test_manager().await;

    assert!(manager.list_clients().await.unwrap().is_empty());
    assert!(manager.list_suppliers().await.unwrap().is_empty());
    assert_eq!(manager.client_phone("Aissata").await.unwrap(), None);
}
