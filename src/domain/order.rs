//! Core business entity: the special order and its status state machine.

use crate::domain::{CancellationReason, ReplacementReason};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// ItemType classifies what kind of article was ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// ItemTypePhone is a handset.
    Phone,
    /// ItemTypeAccessory covers chargers, cases, earphones and the like.
    Accessory,
    /// ItemTypeCarton is a sealed-box unit, graded via CartonGrade.
    Carton,
    /// ItemTypeShipment is a bulk arrival lot.
    Shipment,
}

/// CartonGrade qualifies a sealed-box unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartonGrade {
    Org,
    Gw,
    Active,
    NoActive,
    EsimNoActive,
    EsimActive,
}

/// OrderStatus represents the current state of a special order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// OrderStatusPending indicates the order is registered but not yet
    /// confirmed with the supplier.
    Pending,
    /// OrderStatusOrdered indicates the supplier confirmed the order.
    Ordered,
    /// OrderStatusReceived indicates the goods arrived at the shop.
    Received,
    /// OrderStatusPartialPayment indicates the client paid part of the sale
    /// price. This status is derived from payment updates, never requested.
    PartialPayment,
    /// OrderStatusSold indicates the order was handed over fully paid.
    Sold,
    /// OrderStatusCancelled indicates the order was abandoned, with a reason.
    Cancelled,
    /// OrderStatusReplaced indicates the item was returned and swapped,
    /// with a reason. Reachable even after a sale.
    Replaced,
}

/// StatusChange is a transition a caller may request.
///
/// `PartialPayment` is deliberately absent: it is a side effect of
/// [`SpecialOrder::apply_payment`], not a target of its own. Transitions
/// that require a reason carry it, so a reasonless cancellation cannot be
/// expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    Ordered,
    Received,
    Sold,
    Cancelled(CancellationReason),
    Replaced(ReplacementReason),
}

impl StatusChange {
    /// Returns the status this change leads to.
    pub fn target(&self) -> OrderStatus {
        match self {
            StatusChange::Ordered => OrderStatus::Ordered,
            StatusChange::Received => OrderStatus::Received,
            StatusChange::Sold => OrderStatus::Sold,
            StatusChange::Cancelled(_) => OrderStatus::Cancelled,
            StatusChange::Replaced(_) => OrderStatus::Replaced,
        }
    }
}

/// OrderError represents a business-rule violation on a single order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    /// The requested transition is not in the status graph.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// A cancellation or replacement was requested without a usable reason.
    #[error("a non-empty reason is required to mark an order {0}")]
    MissingReason(OrderStatus),

    /// A payment update fell outside `[0, sale_price]`.
    #[error("amount paid {amount} must be between 0 and the sale price {sale_price}")]
    InvalidAmount {
        amount: Decimal,
        sale_price: Decimal,
    },

    /// An order cannot be sold while the client still owes money.
    #[error("order cannot be marked sold: {remaining} remaining to pay")]
    UnpaidBalance { remaining: Decimal },

    /// Malformed or missing input fields.
    #[error("{0}")]
    Validation(String),
}

/// SpecialOrder is a custom, non-stock customer order requiring supplier
/// procurement before sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialOrder {
    /// ID is the unique identifier assigned by the store at creation.
    pub id: i64,
    /// ClientName is the denormalized client name.
    pub client_name: String,
    /// ClientPhone is the client contact number, if known.
    pub client_phone: Option<String>,
    /// SupplierName is the denormalized supplier name.
    pub supplier_name: String,
    /// Brand of the article (e.g., "iPhone").
    pub brand: String,
    /// Model of the article (e.g., "15 PRO MAX").
    pub model: String,
    /// StorageCapacity is the capacity label (e.g., "256 Go"), if relevant.
    pub storage_capacity: Option<String>,
    /// ItemType classifies the article.
    pub item_type: ItemType,
    /// CartonGrade is set when item_type is Carton.
    pub carton_grade: Option<CartonGrade>,
    /// IMEI is an optional short identifier for the unit.
    pub imei: Option<String>,
    /// PurchasePrice is what the supplier charges.
    pub purchase_price: Decimal,
    /// SalePrice is what the client pays in total.
    pub sale_price: Decimal,
    /// AmountPaid is what the client has paid so far.
    pub amount_paid: Decimal,
    /// Status is the current lifecycle state.
    pub status: OrderStatus,
    /// CancellationReason is set when the order was cancelled.
    pub cancellation_reason: Option<CancellationReason>,
    /// ReplacementReason is set when the order was replaced.
    pub replacement_reason: Option<ReplacementReason>,
    /// OrderDate is when the order was registered. Immutable.
    pub order_date: DateTime<Utc>,
    /// StatusChangedDate is when the status last changed. Sales reports
    /// bucket by this date.
    pub status_changed_date: DateTime<Utc>,
}

/// Returns true if `(from, to)` is an edge of the status graph.
fn transition_allowed(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
        (from, to),
        (Pending, Ordered)
            | (Pending, Cancelled)
            | (Ordered, Received)
            | (Ordered, Cancelled)
            | (Received, Sold)
            | (Received, Replaced)
            | (PartialPayment, Sold)
            | (PartialPayment, Replaced)
            | (PartialPayment, Cancelled)
            | (Sold, Replaced)
    )
}

impl SpecialOrder {
    /// Returns what the client still owes: `sale_price - amount_paid`.
    /// Derived on every call, never stored.
    pub fn remaining_balance(&self) -> Decimal {
        self.sale_price - self.amount_paid
    }

    /// Applies a requested status change and returns the updated order.
    ///
    /// Enforces the transition graph, the fully-paid gate on `Sold`, and
    /// non-empty reasons for `Cancelled` / `Replaced`. On success the new
    /// status is set and `status_changed_date` is stamped with `now`.
    /// The receiver is untouched on failure.
    pub fn apply_status(&self, change: StatusChange, now: DateTime<Utc>) -> Result<Self, OrderError> {
        let target = change.target();

        if !transition_allowed(self.status, target) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }

        let mut updated = self.clone();
        match change {
            StatusChange::Cancelled(reason) => {
                if reason.is_empty() {
                    return Err(OrderError::MissingReason(OrderStatus::Cancelled));
                }
                updated.cancellation_reason = Some(reason);
            }
            StatusChange::Replaced(reason) => {
                if reason.is_empty() {
                    return Err(OrderError::MissingReason(OrderStatus::Replaced));
                }
                updated.replacement_reason = Some(reason);
            }
            StatusChange::Sold => {
                let remaining = self.remaining_balance();
                if remaining > Decimal::ZERO {
                    return Err(OrderError::UnpaidBalance { remaining });
                }
            }
            StatusChange::Ordered | StatusChange::Received => {}
        }

        updated.status = target;
        updated.status_changed_date = now;
        Ok(updated)
    }

    /// Sets the total amount paid and returns the updated order.
    ///
    /// The amount must stay within `[0, sale_price]`. An order in Pending,
    /// Ordered or Received that becomes partly paid is relabeled
    /// PartialPayment; terminal labels (Sold, Cancelled, Replaced) are never
    /// overridden, and `status_changed_date` is stamped only when the label
    /// actually changes.
    pub fn apply_payment(&self, amount: Decimal, now: DateTime<Utc>) -> Result<Self, OrderError> {
        if amount < Decimal::ZERO || amount > self.sale_price {
            return Err(OrderError::InvalidAmount {
                amount,
                sale_price: self.sale_price,
            });
        }

        let mut updated = self.clone();
        updated.amount_paid = amount;

        let relabel = matches!(
            self.status,
            OrderStatus::Pending | OrderStatus::Ordered | OrderStatus::Received
        ) && amount > Decimal::ZERO
            && amount < self.sale_price;

        if relabel && self.status != OrderStatus::PartialPayment {
            updated.status = OrderStatus::PartialPayment;
            updated.status_changed_date = now;
        }

        Ok(updated)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Ordered => "ordered",
            OrderStatus::Received => "received",
            OrderStatus::PartialPayment => "partial_payment",
            OrderStatus::Sold => "sold",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Replaced => "replaced",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "ordered" => Ok(OrderStatus::Ordered),
            "received" => Ok(OrderStatus::Received),
            "partial_payment" => Ok(OrderStatus::PartialPayment),
            "sold" => Ok(OrderStatus::Sold),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "replaced" => Ok(OrderStatus::Replaced),
            _ => Err(format!("Unknown order status: {}", s)),
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ItemType::Phone => "phone",
            ItemType::Accessory => "accessory",
            ItemType::Carton => "carton",
            ItemType::Shipment => "shipment",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "phone" => Ok(ItemType::Phone),
            "accessory" => Ok(ItemType::Accessory),
            "carton" => Ok(ItemType::Carton),
            "shipment" => Ok(ItemType::Shipment),
            _ => Err(format!("Unknown item type: {}", s)),
        }
    }
}

impl std::fmt::Display for CartonGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CartonGrade::Org => "org",
            CartonGrade::Gw => "gw",
            CartonGrade::Active => "active",
            CartonGrade::NoActive => "no_active",
            CartonGrade::EsimNoActive => "esim_no_active",
            CartonGrade::EsimActive => "esim_active",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for CartonGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "org" => Ok(CartonGrade::Org),
            "gw" => Ok(CartonGrade::Gw),
            "active" => Ok(CartonGrade::Active),
            "no_active" => Ok(CartonGrade::NoActive),
            "esim_no_active" => Ok(CartonGrade::EsimNoActive),
            "esim_active" => Ok(CartonGrade::EsimActive),
            _ => Err(format!("Unknown carton grade: {}", s)),
        }
    }
}
