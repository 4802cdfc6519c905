//! SQLite implementation of OrderStore.

use crate::domain::{
    CancellationReason, CartonGrade, Client, ItemType, OrderStatus, ReplacementReason,
    SpecialOrder, Supplier,
};
use crate::storage::{OrderStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::{debug, info};

/// SqliteStore implements OrderStore using SQLite.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

/// SqliteStoreConfig holds SQLite storage configuration.
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// Path to the SQLite database file.
    pub path: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self {
            path: "orders.db".to_string(),
            max_connections: 5,
        }
    }
}

const ORDER_COLUMNS: &str = "id, client_name, client_phone, supplier_name, brand, model, \
    storage_capacity, item_type, carton_grade, imei, purchase_price, sale_price, \
    amount_paid, status, cancellation_reason, replacement_reason, order_date, \
    status_changed_date";

impl SqliteStore {
    /// Creates a new SQLite store instance.
    pub async fn new(config: SqliteStoreConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", config.path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };

        store.migrate().await?;

        info!(path = %config.path, "SQLite order store initialized");
        Ok(store)
    }

    /// Runs database migrations to create the schema.
    ///
    /// The clients and suppliers tables belong to the wider admin app; they
    /// are only bootstrapped here so the directory queries work on a fresh
    /// database file.
    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS special_orders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                client_name TEXT NOT NULL,
                client_phone TEXT,
                supplier_name TEXT NOT NULL,
                brand TEXT NOT NULL,
                model TEXT NOT NULL,
                storage_capacity TEXT,
                item_type TEXT NOT NULL,
                carton_grade TEXT,
                imei TEXT,
                purchase_price TEXT NOT NULL,
                sale_price TEXT NOT NULL,
                amount_paid TEXT NOT NULL,
                status TEXT NOT NULL,
                cancellation_reason TEXT,
                replacement_reason TEXT,
                order_date TEXT NOT NULL,
                status_changed_date TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_special_orders_status ON special_orders(status)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_special_orders_status_changed ON special_orders(status_changed_date)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                phone TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS suppliers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                phone TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl OrderStore for SqliteStore {
    async fn list(&self) -> Result<Vec<SpecialOrder>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM special_orders ORDER BY order_date DESC",
            ORDER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(parse_order_row).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<SpecialOrder>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM special_orders WHERE id = ?",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(parse_order_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, order: &SpecialOrder) -> Result<SpecialOrder, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO special_orders (
                client_name, client_phone, supplier_name, brand, model,
                storage_capacity, item_type, carton_grade, imei,
                purchase_price, sale_price, amount_paid, status,
                cancellation_reason, replacement_reason, order_date, status_changed_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
        )
        .bind(&order.client_name)
        .bind(&order.client_phone)
        .bind(&order.supplier_name)
        .bind(&order.brand)
        .bind(&order.model)
        .bind(&order.storage_capacity)
        .bind(order.item_type.to_string())
        .bind(order.carton_grade.map(|g| g.to_string()))
        .bind(&order.imei)
        .bind(order.purchase_price.to_string())
        .bind(order.sale_price.to_string())
        .bind(order.amount_paid.to_string())
        .bind(order.status.to_string())
        .bind(order.cancellation_reason.as_ref().map(|r| r.to_string()))
        .bind(order.replacement_reason.as_ref().map(|r| r.to_string()))
        .bind(order.order_date.to_rfc3339())
        .bind(order.status_changed_date.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, client = %order.client_name, "Order inserted");

        let mut stored = order.clone();
        stored.id = id;
        Ok(stored)
    }

    async fn update(&self, order: &SpecialOrder) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE special_orders SET
                client_name = ?1, client_phone = ?2, supplier_name = ?3,
                brand = ?4, model = ?5, storage_capacity = ?6, item_type = ?7,
                carton_grade = ?8, imei = ?9, purchase_price = ?10,
                sale_price = ?11, amount_paid = ?12, status = ?13,
                cancellation_reason = ?14, replacement_reason = ?15,
                status_changed_date = ?16
            WHERE id = ?17
            "#,
        )
        .bind(&order.client_name)
        .bind(&order.client_phone)
        .bind(&order.supplier_name)
        .bind(&order.brand)
        .bind(&order.model)
        .bind(&order.storage_capacity)
        .bind(order.item_type.to_string())
        .bind(order.carton_grade.map(|g| g.to_string()))
        .bind(&order.imei)
        .bind(order.purchase_price.to_string())
        .bind(order.sale_price.to_string())
        .bind(order.amount_paid.to_string())
        .bind(order.status.to_string())
        .bind(order.cancellation_reason.as_ref().map(|r| r.to_string()))
        .bind(order.replacement_reason.as_ref().map(|r| r.to_string()))
        .bind(order.status_changed_date.to_rfc3339())
        .bind(order.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("order {}", order.id)));
        }

        debug!(id = order.id, status = %order.status, "Order updated");
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM special_orders WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("order {}", id)));
        }

        debug!(id, "Order deleted");
        Ok(())
    }

    async fn list_clients(&self) -> Result<Vec<Client>, StoreError> {
        let rows = sqlx::query("SELECT id, name, phone FROM clients ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(Client {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    phone: row.try_get("phone")?,
                })
            })
            .collect()
    }

    async fn list_suppliers(&self) -> Result<Vec<Supplier>, StoreError> {
        let rows = sqlx::query("SELECT id, name, phone FROM suppliers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(Supplier {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    phone: row.try_get("phone")?,
                })
            })
            .collect()
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}

/// Parses an amount column. Missing or unparseable amounts read back as
/// zero so a damaged row never breaks report aggregation; validation of
/// new amounts happens at write time.
fn parse_amount(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<Decimal, StoreError> {
    let raw: Option<String> = row.try_get(column)?;
    Ok(raw
        .and_then(|s| Decimal::from_str(&s).ok())
        .unwrap_or(Decimal::ZERO))
}

fn parse_date(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<DateTime<Utc>, StoreError> {
    let raw: String = row.try_get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("Invalid {}: {}", column, e)))
}

/// Parses a special order from a database row.
fn parse_order_row(row: &sqlx::sqlite::SqliteRow) -> Result<SpecialOrder, StoreError> {
    let item_type_str: String = row.try_get("item_type")?;
    let item_type = ItemType::from_str(&item_type_str).map_err(StoreError::InvalidData)?;

    let carton_grade_str: Option<String> = row.try_get("carton_grade")?;
    let carton_grade = carton_grade_str
        .map(|s| CartonGrade::from_str(&s))
        .transpose()
        .map_err(StoreError::InvalidData)?;

    let status_str: String = row.try_get("status")?;
    let status = OrderStatus::from_str(&status_str).map_err(StoreError::InvalidData)?;

    // Reason parsing is infallible: unknown text is a free-form reason.
    let cancellation_reason = row
        .try_get::<Option<String>, _>("cancellation_reason")?
        .and_then(|s| CancellationReason::from_str(&s).ok());
    let replacement_reason = row
        .try_get::<Option<String>, _>("replacement_reason")?
        .and_then(|s| ReplacementReason::from_str(&s).ok());

    Ok(SpecialOrder {
        id: row.try_get("id")?,
        client_name: row.try_get("client_name")?,
        client_phone: row.try_get("client_phone")?,
        supplier_name: row.try_get("supplier_name")?,
        brand: row.try_get("brand")?,
        model: row.try_get("model")?,
        storage_capacity: row.try_get("storage_capacity")?,
        item_type,
        carton_grade,
        imei: row.try_get("imei")?,
        purchase_price: parse_amount(row, "purchase_price")?,
        sale_price: parse_amount(row, "sale_price")?,
        amount_paid: parse_amount(row, "amount_paid")?,
        status,
        cancellation_reason,
        replacement_reason,
        order_date: parse_date(row, "order_date")?,
        status_changed_date: parse_date(row, "status_changed_date")?,
    })
}
