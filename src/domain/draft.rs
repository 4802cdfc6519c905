//! Validated input for order creation and full-record correction.

use crate::domain::{
    CancellationReason, CartonGrade, ItemType, OrderError, OrderStatus, ReplacementReason,
    SpecialOrder,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum accepted IMEI length. The entry form only captures the last
/// digits of the full IMEI.
pub const IMEI_MAX_LEN: usize = 6;

/// OrderDraft carries the writable fields of a new special order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub client_name: String,
    pub client_phone: Option<String>,
    pub supplier_name: String,
    pub brand: String,
    pub model: String,
    pub storage_capacity: Option<String>,
    pub item_type: ItemType,
    pub carton_grade: Option<CartonGrade>,
    pub imei: Option<String>,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    /// Initial deposit, if the client paid something up front.
    pub amount_paid: Option<Decimal>,
}

/// OrderUpdate is a full-record correction of an existing order.
///
/// Unlike a lifecycle transition it sets the status exactly as passed.
/// It still re-validates every invariant, so a reasonless Cancelled or an
/// overpaid order cannot be written through this path either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub client_name: String,
    pub client_phone: Option<String>,
    pub supplier_name: String,
    pub brand: String,
    pub model: String,
    pub storage_capacity: Option<String>,
    pub item_type: ItemType,
    pub carton_grade: Option<CartonGrade>,
    pub imei: Option<String>,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub amount_paid: Decimal,
    pub status: OrderStatus,
    pub cancellation_reason: Option<CancellationReason>,
    pub replacement_reason: Option<ReplacementReason>,
}

fn require_field(value: &str, name: &str) -> Result<(), OrderError> {
    if value.trim().is_empty() {
        return Err(OrderError::Validation(format!("{} is required", name)));
    }
    Ok(())
}

fn check_prices(purchase: Decimal, sale: Decimal) -> Result<(), OrderError> {
    if purchase < Decimal::ZERO {
        return Err(OrderError::Validation(
            "purchase_price must be non-negative".into(),
        ));
    }
    if sale < Decimal::ZERO {
        return Err(OrderError::Validation(
            "sale_price must be non-negative".into(),
        ));
    }
    Ok(())
}

fn check_item(
    item_type: ItemType,
    carton_grade: Option<CartonGrade>,
    imei: Option<&str>,
) -> Result<(), OrderError> {
    if item_type == ItemType::Carton && carton_grade.is_none() {
        return Err(OrderError::Validation(
            "carton_grade is required for carton orders".into(),
        ));
    }
    if let Some(imei) = imei {
        if imei.chars().count() > IMEI_MAX_LEN {
            return Err(OrderError::Validation(format!(
                "imei must be at most {} characters",
                IMEI_MAX_LEN
            )));
        }
    }
    Ok(())
}

impl OrderDraft {
    /// Checks required identifiers, price bounds and item consistency.
    pub fn validate(&self) -> Result<(), OrderError> {
        require_field(&self.client_name, "client_name")?;
        require_field(&self.supplier_name, "supplier_name")?;
        require_field(&self.brand, "brand")?;
        require_field(&self.model, "model")?;
        check_prices(self.purchase_price, self.sale_price)?;
        check_item(self.item_type, self.carton_grade, self.imei.as_deref())?;

        let paid = self.amount_paid.unwrap_or(Decimal::ZERO);
        if paid < Decimal::ZERO || paid > self.sale_price {
            return Err(OrderError::InvalidAmount {
                amount: paid,
                sale_price: self.sale_price,
            });
        }
        Ok(())
    }

    /// Builds a Pending order from the draft. The id is assigned by the
    /// store at insert time.
    pub fn into_order(self, now: DateTime<Utc>) -> Result<SpecialOrder, OrderError> {
        self.validate()?;
        let amount_paid = self.amount_paid.unwrap_or(Decimal::ZERO);
        Ok(SpecialOrder {
            id: 0,
            client_name: self.client_name,
            client_phone: self.client_phone,
            supplier_name: self.supplier_name,
            brand: self.brand,
            model: self.model,
            storage_capacity: self.storage_capacity,
            item_type: self.item_type,
            carton_grade: self.carton_grade,
            imei: self.imei,
            purchase_price: self.purchase_price,
            sale_price: self.sale_price,
            amount_paid,
            status: OrderStatus::Pending,
            cancellation_reason: None,
            replacement_reason: None,
            order_date: now,
            status_changed_date: now,
        })
    }
}

impl OrderUpdate {
    /// Checks the same constraints as [`OrderDraft::validate`], plus reason
    /// presence for the explicitly-passed status.
    pub fn validate(&self) -> Result<(), OrderError> {
        require_field(&self.client_name, "client_name")?;
        require_field(&self.supplier_name, "supplier_name")?;
        require_field(&self.brand, "brand")?;
        require_field(&self.model, "model")?;
        check_prices(self.purchase_price, self.sale_price)?;
        check_item(self.item_type, self.carton_grade, self.imei.as_deref())?;

        if self.amount_paid < Decimal::ZERO || self.amount_paid > self.sale_price {
            return Err(OrderError::InvalidAmount {
                amount: self.amount_paid,
                sale_price: self.sale_price,
            });
        }

        match self.status {
            OrderStatus::Cancelled => {
                if self
                    .cancellation_reason
                    .as_ref()
                    .is_none_or(|r| r.is_empty())
                {
                    return Err(OrderError::MissingReason(OrderStatus::Cancelled));
                }
            }
            OrderStatus::Replaced => {
                if self.replacement_reason.as_ref().is_none_or(|r| r.is_empty()) {
                    return Err(OrderError::MissingReason(OrderStatus::Replaced));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Applies the correction onto an existing order, preserving its id and
    /// order date. `status_changed_date` is stamped only when the passed
    /// status differs from the current one.
    pub fn apply_to(
        self,
        current: &SpecialOrder,
        now: DateTime<Utc>,
    ) -> Result<SpecialOrder, OrderError> {
        self.validate()?;
        let status_changed_date = if self.status != current.status {
            now
        } else {
            current.status_changed_date
        };
        Ok(SpecialOrder {
            id: current.id,
            client_name: self.client_name,
            client_phone: self.client_phone,
            supplier_name: self.supplier_name,
            brand: self.brand,
            model: self.model,
            storage_capacity: self.storage_capacity,
            item_type: self.item_type,
            carton_grade: self.carton_grade,
            imei: self.imei,
            purchase_price: self.purchase_price,
            sale_price: self.sale_price,
            amount_paid: self.amount_paid,
            status: self.status,
            cancellation_reason: self.cancellation_reason,
            replacement_reason: self.replacement_reason,
            order_date: current.order_date,
            status_changed_date,
        })
    }
}
